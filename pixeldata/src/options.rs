//! Caller-facing decode knobs.

/// The sample format of decoded output. `Auto` defers to
/// [`crate::pixel_info::resolve_output_format`]'s heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Auto,
    U8,
    I16,
    I32,
    F32,
}

/// How multi-sample pixels are arranged in the destination buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputLayout {
    #[default]
    Interleaved,
    Planar,
    /// Keep whatever `PlanarConfiguration` the source declares.
    KeepConfig,
}

/// Which HT-J2K decoder to prefer when more than one is compiled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HtJ2kBackend {
    #[default]
    Auto,
    BackendA,
    BackendB,
}

/// Options controlling a single `decode_pixels`/`decode_into` call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecodeOptions {
    pub output_format: OutputFormat,
    pub output_layout: OutputLayout,
    pub apply_rescale: bool,
    /// 0 means "compute a tight/aligned stride".
    pub output_stride: usize,
    pub output_alignment: usize,
    /// 0 = single-threaded, -1 = auto-detect cores.
    pub decoder_threads: i32,
    pub htj2k_backend: HtJ2kBackend,
}

impl Default for DecodeOptions {
    fn default() -> DecodeOptions {
        DecodeOptions {
            output_format: OutputFormat::Auto,
            output_layout: OutputLayout::Interleaved,
            apply_rescale: false,
            output_stride: 0,
            output_alignment: 1,
            decoder_threads: 0,
            htj2k_backend: HtJ2kBackend::Auto,
        }
    }
}
