pub mod codecs;
pub mod items;
pub mod scenario;

pub use codecs::{json_codec, text_codec, RejectingCodec};
pub use items::Reading;
pub use scenario::{reference_with, through_wire, values, SetOp};

/// Assert that two sets hold the same items under the same seq nums
#[macro_export]
macro_rules! assert_same_records {
    ($left:expr, $right:expr) => {
        assert_eq!(
            $crate::assertions::records_of(&$left.snapshot().unwrap()),
            $crate::assertions::records_of(&$right.snapshot().unwrap()),
            "sets {} and {} hold different records",
            $left.identity(),
            $right.identity()
        );
    };
}
