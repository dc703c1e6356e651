// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]

mod error;
mod national_id;
mod normalize;
mod types;
mod validation;

#[cfg(test)]
mod tests;

// Re-export public types
pub use error::DomainError;
pub use national_id::NationalId;
pub use normalize::{
    fold, normalize_email, normalize_name, normalize_phone, similarity, spanish_title_case,
};
pub use types::{Attendance, Audience, CanonicalField, CatalogKind, ErrorKind, ReviewStatus, Source};
pub use validation::{NormalizedRow, RawRow, validate_row};
