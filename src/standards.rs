//! Known code editions and their Reference-side defaults.
//!
//! Each standard overrides the Reference containers' envelope resistances
//! and ventilation rate; fields a standard does not name keep their
//! definition defaults. The selected edition is the `d_13` dropdown token.

use enercode_model::{ReferenceStandard, StandardsCatalog};
use enercode_store::FieldValue;

pub use enercode_model::REFERENCE_STANDARD_KEY;

/// Token of the edition selected by default.
pub const DEFAULT_STANDARD: &str = "OBC-SB12-2017";

pub fn catalog() -> StandardsCatalog {
    StandardsCatalog::new()
        .with(
            // Ontario Building Code SB-12, 2017: prescriptive package A1.
            ReferenceStandard::new("OBC-SB12-2017")
                .with("f_85", FieldValue::Number(8.67)) // roof RSI
                .with("f_86", FieldValue::Number(4.10)) // walls
                .with("f_87", FieldValue::Number(0.625)) // windows (U 1.6)
                .with("f_88", FieldValue::Number(5.46)) // floor
                .with("d_119", FieldValue::Number(0.30)),
        )
        .with(
            // National Building Code 9.36, 2020 edition, zone 6 values.
            ReferenceStandard::new("NBC-9.36-2020")
                .with("f_85", FieldValue::Number(10.43))
                .with("f_86", FieldValue::Number(4.76))
                .with("f_87", FieldValue::Number(0.625))
                .with("f_88", FieldValue::Number(5.46))
                .with("d_119", FieldValue::Number(0.25)),
        )
}
