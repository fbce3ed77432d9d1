mod error;
mod text_codec;

cfg_if! {
    if #[cfg(feature = "json_codec")] {
        mod json_codec;
        pub use json_codec::JsonCodec;
    }
}

pub use error::CodecError;
pub use text_codec::TextCodec;

/// Converts items of one type to and from text.
///
/// Codecs are supplied from outside the core. A tracking set consults
/// `is_supported` once, the first time it is asked to produce serialized payloads,
/// and remembers the verdict.
pub trait ItemCodec<T>: Send + Sync {
    fn item_to_text(&self, item: &T) -> Result<String, CodecError>;

    fn text_to_item(&self, text: &str) -> Result<T, CodecError>;

    fn is_supported(&self) -> bool {
        true
    }
}
