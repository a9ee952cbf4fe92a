//! Top-level parse orchestration and the [`DicomFile`] facade.

use std::path::{Path, PathBuf};

use dcm_core::dictionary::DataDictionary;
use dcm_core::uid::trim_uid;
use dcm_core::{DataElement, DataSet, Stream, Tag, TsFlags};
use dcm_dictionary::StandardDataDictionary;
use dcm_parser::headerless::detect_headerless_syntax;
use snafu::{OptionExt, ResultExt};

use crate::error::{HeaderlessSnafu, Result, UnsupportedTransferSyntaxSnafu};
use crate::meta::{has_preamble, read_file_meta, FileMetaTable};

/// A parsed DICOM object: the root [`DataSet`] plus file-meta information
/// and the bookkeeping (dictionary, transfer-syntax flags) needed to keep
/// resuming its lazy element loop.
pub struct DicomFile {
    dataset: DataSet,
    dict: StandardDataDictionary,
    ts_flags: TsFlags,
    transfer_syntax_uid: String,
    meta: Option<FileMetaTable>,
    path: Option<PathBuf>,
    pixel_info: Option<dcm_pixeldata::PixelInfo>,
}

impl DicomFile {
    /// Opens and memory-maps a file, then parses its preamble, file-meta
    /// group (if present) and the start of its dataset.
    pub fn read_file(path: impl AsRef<Path>) -> Result<DicomFile> {
        let path = path.as_ref();
        let stream = Stream::map_file(path)?;
        let mut file = load(stream)?;
        file.path = Some(path.to_path_buf());
        Ok(file)
    }

    /// Parses an in-memory buffer. When false, the caller guarantees
    /// `bytes` outlives the returned [`DicomFile`]; `read_borrowed` covers
    /// that case without copying.
    pub fn read_bytes(bytes: Vec<u8>) -> Result<DicomFile> {
        load(Stream::from_owned(bytes))
    }

    /// As [`DicomFile::read_bytes`], but borrows a `'static` buffer instead
    /// of copying it.
    pub fn read_borrowed(bytes: &'static [u8]) -> Result<DicomFile> {
        load(Stream::from_borrowed(bytes))
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn meta(&self) -> Option<&FileMetaTable> {
        self.meta.as_ref()
    }

    pub fn transfer_syntax_uid(&self) -> &str {
        &self.transfer_syntax_uid
    }

    pub fn transfer_syntax_flags(&self) -> TsFlags {
        self.ts_flags
    }

    pub fn dataset(&self) -> &DataSet {
        &self.dataset
    }

    /// Direct mutable access for advanced callers.
    pub fn dataset_mut(&mut self) -> &mut DataSet {
        &mut self.dataset
    }

    /// Swaps the dataset's backing stream (e.g. after inflating a deflated
    /// transfer syntax out-of-band) and invalidates any cached pixel
    /// metadata, since it was computed against the old bytes.
    pub fn attach_stream(&mut self, stream: Stream) {
        self.dataset.set_stream(stream);
        self.pixel_info = None;
    }

    /// Looks up `tag`, resuming the element loop first if it has not been
    /// reached yet.
    pub fn get(&mut self, tag: Tag) -> &DataElement {
        self.ensure_loaded(tag);
        self.dataset.get(tag)
    }

    pub fn get_by_keyword(&mut self, keyword: &str) -> &DataElement {
        match self.dict.by_name(keyword) {
            Some(entry) => self.get(entry.tag()),
            None => DataElement::missing(),
        }
    }

    fn ensure_loaded(&mut self, tag: Tag) {
        if let Err(err) = dcm_parser::ensure_loaded(&mut self.dataset, &self.dict, self.ts_flags, tag) {
            tracing::warn!(%err, %tag, "failed to resume parsing toward requested tag");
        }
    }

    /// Fully materializes the dataset (resuming from wherever the lazy
    /// cursor left off) and iterates its elements in tag order.
    pub fn iter(&mut self) -> impl Iterator<Item = &DataElement> {
        if let Err(err) = dcm_parser::parse_dataset(&mut self.dataset, &self.dict, self.ts_flags) {
            tracing::warn!(%err, "dataset parse stopped early");
        }
        self.dataset.iter()
    }

    /// Imaging metadata needed to decode pixel frames, cached until the
    /// backing stream is swapped via [`DicomFile::attach_stream`].
    pub fn pixel_info(&mut self) -> Result<&dcm_pixeldata::PixelInfo> {
        self.ensure_pixel_info()?;
        Ok(self.pixel_info.as_ref().expect("just populated"))
    }

    /// Decodes `frame_index` into a freshly allocated buffer.
    pub fn pixel_data(&mut self, frame_index: usize, opts: &dcm_pixeldata::DecodeOptions) -> Result<Vec<u8>> {
        self.ensure_pixel_info()?;
        Ok(dcm_pixeldata::decode_pixels(&self.dataset, frame_index, opts)?)
    }

    /// Decodes `frame_index` into the caller-supplied buffer.
    pub fn pixel_data_into(&mut self, dst: &mut [u8], frame_index: usize, opts: &dcm_pixeldata::DecodeOptions) -> Result<()> {
        self.ensure_pixel_info()?;
        Ok(dcm_pixeldata::decode_into(&self.dataset, dst, frame_index, opts)?)
    }

    /// The Modality LUT or linear rescale a monochrome frame should apply,
    /// if any.
    pub fn modality_lut(&mut self) -> Result<Option<dcm_pixeldata::Scaling>> {
        self.ensure_pixel_info()?;
        Ok(dcm_pixeldata::resolve_scaling(&self.dataset, self.dataset.is_little_endian()))
    }

    fn ensure_pixel_info(&mut self) -> Result<()> {
        if self.pixel_info.is_some() {
            return Ok(());
        }
        if let Err(err) = dcm_parser::parse_dataset(&mut self.dataset, &self.dict, self.ts_flags) {
            tracing::warn!(%err, "dataset parse stopped early before resolving pixel metadata");
        }
        let info = dcm_pixeldata::pixel_info(&self.dataset)?;
        self.pixel_info = Some(info);
        Ok(())
    }
}

fn load(stream: Stream) -> Result<DicomFile> {
    let dict = StandardDataDictionary;

    if has_preamble(&stream) {
        let mut cursor = stream.clone();
        cursor.skip(132)?;
        let meta = read_file_meta(&mut cursor)?;

        let uid = trim_uid(&meta.transfer_syntax_uid);
        let ts = dcm_transfer_syntax::lookup(uid).context(UnsupportedTransferSyntaxSnafu { uid })?;

        let little_endian = ts.is_little_endian();
        let explicit_vr = ts.is_explicit_vr();
        let body = cursor.sub_stream(cursor.remaining());

        let dataset_stream = if ts.is_deflated() {
            let mut body = body;
            let compressed = body.try_read(body.remaining())?;
            let inflated = dcm_transfer_syntax::deflate::inflate(compressed.as_slice())?;
            Stream::from_owned(inflated)
        } else {
            body
        };

        let mut dataset = DataSet::new(dataset_stream, little_endian, explicit_vr);
        dataset.set_transfer_syntax(dcm_core::Uid::lookup(&dcm_dictionary::StandardUidDictionary, uid));

        Ok(DicomFile {
            dataset,
            dict,
            ts_flags: ts.flags(),
            transfer_syntax_uid: uid.to_owned(),
            meta: Some(meta),
            path: None,
            pixel_info: None,
        })
    } else {
        let syntax = detect_headerless_syntax(&stream, &dict).context(HeaderlessSnafu)?;
        let little_endian = syntax.little_endian();
        let explicit_vr = syntax.explicit_vr();

        let mut flags = TsFlags::empty();
        if explicit_vr {
            flags |= TsFlags::EXPLICIT_VR;
        }
        if !little_endian {
            flags |= TsFlags::BIG_ENDIAN;
        }

        let transfer_syntax_uid = match syntax {
            dcm_parser::headerless::HeaderlessSyntax::ExplicitLittleEndian => dcm_transfer_syntax::EXPLICIT_VR_LITTLE_ENDIAN,
            dcm_parser::headerless::HeaderlessSyntax::ExplicitBigEndian => dcm_transfer_syntax::EXPLICIT_VR_BIG_ENDIAN,
            dcm_parser::headerless::HeaderlessSyntax::ImplicitLittleEndian => dcm_transfer_syntax::IMPLICIT_VR_LITTLE_ENDIAN,
            dcm_parser::headerless::HeaderlessSyntax::ImplicitBigEndian => {
                // Not a real standard UID; implicit VR big endian has no
                // registered transfer syntax, but detection can still infer
                // the wire layout for a raw, non-conformant stream.
                "1.2.840.10008.1.2.implicit-big-endian"
            }
        }
        .to_owned();

        let dataset = DataSet::new(stream, little_endian, explicit_vr);

        Ok(DicomFile {
            dataset,
            dict,
            ts_flags: flags,
            transfer_syntax_uid,
            meta: None,
            path: None,
            pixel_info: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn explicit_le_element(group: u16, element: u16, vr: &[u8; 2], value: &[u8]) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&group.to_le_bytes());
        bytes.extend_from_slice(&element.to_le_bytes());
        bytes.extend_from_slice(vr);
        bytes.extend_from_slice(&(value.len() as u16).to_le_bytes());
        bytes.extend_from_slice(value);
        bytes
    }

    fn sample_part10_bytes() -> Vec<u8> {
        let mut meta_elements = Vec::new();
        meta_elements.extend(explicit_le_element(0x0002, 0x0010, b"UI", b"1.2.840.10008.1.2.1\0"));

        let mut meta = Vec::new();
        meta.extend(explicit_le_element(0x0002, 0x0000, b"UL", &(meta_elements.len() as u32).to_le_bytes()));
        meta.extend(meta_elements);

        let mut dataset = Vec::new();
        dataset.extend(explicit_le_element(0x0008, 0x0060, b"CS", b"CT"));

        let mut bytes = vec![0u8; 128];
        bytes.extend_from_slice(b"DICM");
        bytes.extend(meta);
        bytes.extend(dataset);
        bytes
    }

    #[test]
    fn reads_part10_file_and_resolves_transfer_syntax() {
        let mut file = DicomFile::read_bytes(sample_part10_bytes()).unwrap();
        assert_eq!(file.transfer_syntax_uid(), "1.2.840.10008.1.2.1");
        let modality = file.get(Tag::from((0x0008, 0x0060)));
        assert_eq!(modality.to_string_view().unwrap(), "CT");
    }

    fn sample_part10_with_pixel_data() -> Vec<u8> {
        let mut meta_elements = Vec::new();
        meta_elements.extend(explicit_le_element(0x0002, 0x0010, b"UI", b"1.2.840.10008.1.2.1\0"));

        let mut meta = Vec::new();
        meta.extend(explicit_le_element(0x0002, 0x0000, b"UL", &(meta_elements.len() as u32).to_le_bytes()));
        meta.extend(meta_elements);

        let mut dataset = Vec::new();
        dataset.extend(explicit_le_element(0x0028, 0x0002, b"US", &1u16.to_le_bytes())); // SamplesPerPixel
        dataset.extend(explicit_le_element(0x0028, 0x0010, b"US", &1u16.to_le_bytes())); // Rows
        dataset.extend(explicit_le_element(0x0028, 0x0011, b"US", &2u16.to_le_bytes())); // Columns
        dataset.extend(explicit_le_element(0x0028, 0x0100, b"US", &16u16.to_le_bytes())); // BitsAllocated
        dataset.extend(explicit_le_element(0x0028, 0x0101, b"US", &16u16.to_le_bytes())); // BitsStored
        dataset.extend(explicit_le_element(0x0028, 0x0102, b"US", &15u16.to_le_bytes())); // HighBit
        dataset.extend(explicit_le_element(0x0028, 0x0103, b"US", &0u16.to_le_bytes())); // PixelRepresentation
        dataset.extend(explicit_le_element(0x7FE0, 0x0010, b"OW", &[0x34, 0x12, 0xCD, 0xAB]));

        let mut bytes = vec![0u8; 128];
        bytes.extend_from_slice(b"DICM");
        bytes.extend(meta);
        bytes.extend(dataset);
        bytes
    }

    #[test]
    fn decodes_pixel_data_through_the_file_facade() {
        let mut file = DicomFile::read_bytes(sample_part10_with_pixel_data()).unwrap();
        let info = file.pixel_info().unwrap();
        assert_eq!(info.rows, 1);
        assert_eq!(info.columns, 2);

        let opts = dcm_pixeldata::DecodeOptions {
            output_format: dcm_pixeldata::OutputFormat::I16,
            ..dcm_pixeldata::DecodeOptions::default()
        };
        let frame = file.pixel_data(0, &opts).unwrap();
        assert_eq!(frame, vec![0x34, 0x12, 0xCD, 0xAB]);
    }

    #[test]
    fn reattaching_the_stream_invalidates_cached_pixel_info() {
        let mut file = DicomFile::read_bytes(sample_part10_with_pixel_data()).unwrap();
        file.pixel_info().unwrap();
        assert!(file.pixel_info.is_some());

        file.attach_stream(Stream::from_owned(sample_part10_with_pixel_data()));
        assert!(file.pixel_info.is_none());
    }

    #[test]
    fn reads_headerless_implicit_vr_stream() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&0x0008u16.to_le_bytes());
        bytes.extend_from_slice(&0x0060u16.to_le_bytes());
        bytes.extend_from_slice(&2u32.to_le_bytes());
        bytes.extend_from_slice(b"CT");

        let mut file = DicomFile::read_bytes(bytes).unwrap();
        assert!(file.meta().is_none());
        let modality = file.get(Tag::from((0x0008, 0x0060)));
        assert_eq!(modality.to_string_view().unwrap(), "CT");
    }
}
