//! Modality LUT and linear rescale lookup.

use dcm_core::DataSet;

use crate::pixel_info::{LUT_DATA, LUT_DESCRIPTOR, MODALITY_LUT_SEQUENCE, RESCALE_INTERCEPT, RESCALE_SLOPE};

/// A Modality LUT: a dense table mapping stored values `[first_mapped,
/// first_mapped + entries.len())` to their rescaled output.
pub struct ModalityLut {
    first_mapped: i64,
    entries: Vec<u16>,
}

impl ModalityLut {
    /// Maps a stored value to its output, clamping the lookup index to the
    /// table's ends rather than panicking on an out-of-range stored value.
    pub fn map(&self, sv: i64) -> f32 {
        let n = self.entries.len() as i64;
        let index = (sv - self.first_mapped).clamp(0, n - 1);
        self.entries[index as usize] as f32
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rescale {
    pub slope: f64,
    pub intercept: f64,
}

impl Rescale {
    pub fn map(&self, sv: i64) -> f32 {
        (sv as f64 * self.slope + self.intercept) as f32
    }
}

/// The scaling function a monochrome frame should apply, preferring a
/// Modality LUT over a linear rescale when both are present.
pub enum Scaling {
    Lut(ModalityLut),
    Linear(Rescale),
}

impl Scaling {
    pub fn map(&self, sv: i64) -> f32 {
        match self {
            Scaling::Lut(lut) => lut.map(sv),
            Scaling::Linear(r) => r.map(sv),
        }
    }
}

pub fn read_modality_lut(dataset: &DataSet, little_endian: bool) -> Option<ModalityLut> {
    let seq_element = dataset.get(MODALITY_LUT_SEQUENCE);
    let sequence = seq_element.sequence()?;
    let item = sequence.item(0)?;
    let descriptor = item.get(LUT_DESCRIPTOR);
    let values = descriptor.to_i64_vector(little_endian).ok()?;
    let &[_count, first_mapped, _bits] = values.as_slice() else {
        return None;
    };

    let data_element = item.get(LUT_DATA);
    let raw = data_element.value_span();
    let entries = raw
        .chunks_exact(2)
        .map(|c| u16::from_le_bytes([c[0], c[1]]))
        .collect::<Vec<_>>();
    if entries.is_empty() {
        return None;
    }
    Some(ModalityLut { first_mapped, entries })
}

pub fn read_rescale(dataset: &DataSet, little_endian: bool) -> Option<Rescale> {
    let slope_elem = dataset.get(RESCALE_SLOPE);
    let intercept_elem = dataset.get(RESCALE_INTERCEPT);
    if slope_elem.is_missing() && intercept_elem.is_missing() {
        return None;
    }
    let slope = slope_elem.to_f64(little_endian).unwrap_or(1.0);
    let intercept = intercept_elem.to_f64(little_endian).unwrap_or(0.0);
    Some(Rescale { slope, intercept })
}

/// Resolves the scaling a monochrome frame should apply: a Modality LUT
/// when present, otherwise a linear rescale if slope != 1 or intercept != 0.
pub fn resolve_scaling(dataset: &DataSet, little_endian: bool) -> Option<Scaling> {
    if let Some(lut) = read_modality_lut(dataset, little_endian) {
        return Some(Scaling::Lut(lut));
    }
    match read_rescale(dataset, little_endian) {
        Some(r) if r.slope != 1.0 || r.intercept != 0.0 => Some(Scaling::Linear(r)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dcm_core::{DataElement, Storage, Stream, Vr};

    fn ds_element(value: &str) -> DataElement {
        DataElement::new(RESCALE_SLOPE, Vr::DS, value.len() as u32, 0, Storage::Owned(value.as_bytes().to_vec()))
    }

    #[test]
    fn rescale_applies_linear_transform() {
        let mut ds = DataSet::new(Stream::from_owned(vec![]), true, true);
        ds.insert(ds_element("2.0"));
        ds.insert(DataElement::new(
            RESCALE_INTERCEPT,
            Vr::DS,
            4,
            0,
            Storage::Owned(b"-10".to_vec()),
        ));
        let scaling = resolve_scaling(&ds, true).unwrap();
        assert_eq!(scaling.map(100), 190.0);
    }

    #[test]
    fn identity_rescale_yields_no_scaling() {
        let mut ds = DataSet::new(Stream::from_owned(vec![]), true, true);
        ds.insert(ds_element("1"));
        ds.insert(DataElement::new(RESCALE_INTERCEPT, Vr::DS, 1, 0, Storage::Owned(b"0".to_vec())));
        assert!(resolve_scaling(&ds, true).is_none());
    }
}
