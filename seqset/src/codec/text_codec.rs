use std::{fmt::Display, marker::PhantomData, str::FromStr};

use super::{CodecError, ItemCodec};

// TextCodec
/// Codec for items that already have a textual form through `Display` and `FromStr`.
pub struct TextCodec<T> {
    phantom_t: PhantomData<fn() -> T>,
}

impl<T> TextCodec<T> {
    pub fn new() -> Self {
        Self {
            phantom_t: PhantomData,
        }
    }
}

impl<T> Default for TextCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ItemCodec<T> for TextCodec<T>
where
    T: Display + FromStr,
    T::Err: Display,
{
    fn item_to_text(&self, item: &T) -> Result<String, CodecError> {
        Ok(item.to_string())
    }

    fn text_to_item(&self, text: &str) -> Result<T, CodecError> {
        text.parse::<T>()
            .map_err(|error| CodecError::new(format!("cannot parse {:?}: {}", text, error)))
    }
}
