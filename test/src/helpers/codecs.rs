use std::{fmt::Display, marker::PhantomData, str::FromStr, sync::Arc};

use seqset::{CodecError, ItemCodec, JsonCodec, TextCodec};

pub fn text_codec<T>() -> Arc<dyn ItemCodec<T>>
where
    T: Display + FromStr + 'static,
    T::Err: Display,
{
    Arc::new(TextCodec::<T>::new())
}

pub fn json_codec<T>() -> Arc<dyn ItemCodec<T>>
where
    T: serde::Serialize + serde::de::DeserializeOwned + 'static,
{
    Arc::new(JsonCodec::<T>::new())
}

// RejectingCodec
/// Claims support but fails on every conversion
pub struct RejectingCodec<T> {
    phantom_t: PhantomData<fn() -> T>,
}

impl<T> RejectingCodec<T> {
    pub fn new() -> Self {
        Self {
            phantom_t: PhantomData,
        }
    }
}

impl<T> Default for RejectingCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ItemCodec<T> for RejectingCodec<T> {
    fn item_to_text(&self, _item: &T) -> Result<String, CodecError> {
        Err(CodecError::new("rejected"))
    }

    fn text_to_item(&self, text: &str) -> Result<T, CodecError> {
        Err(CodecError::new(format!("rejected {:?}", text)))
    }
}
