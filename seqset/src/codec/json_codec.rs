use std::marker::PhantomData;

use serde::{de::DeserializeOwned, Serialize};

use super::{CodecError, ItemCodec};

// JsonCodec
/// Codec for any serde item type, using its JSON text form.
pub struct JsonCodec<T> {
    phantom_t: PhantomData<fn() -> T>,
}

impl<T> JsonCodec<T> {
    pub fn new() -> Self {
        Self {
            phantom_t: PhantomData,
        }
    }
}

impl<T> Default for JsonCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Serialize + DeserializeOwned> ItemCodec<T> for JsonCodec<T> {
    fn item_to_text(&self, item: &T) -> Result<String, CodecError> {
        serde_json::to_string(item).map_err(|error| CodecError::new(error.to_string()))
    }

    fn text_to_item(&self, text: &str) -> Result<T, CodecError> {
        serde_json::from_str(text).map_err(|error| CodecError::new(error.to_string()))
    }
}
