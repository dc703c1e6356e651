// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Runtime configuration consumed by the ingest pipeline.
//!
//! Loading configuration from files or the environment is the transport
//! layer's concern; this module only defines the options and their
//! defaults.

use padron_domain::CanonicalField;

/// Encoding tried when the CSV bytes are not valid UTF-8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FallbackEncoding {
    /// ISO-8859-1: every byte maps to the code point of the same value.
    #[default]
    Latin1,
    /// Windows-1252: Latin-1 with printable characters in 0x80..=0x9F.
    Windows1252,
}

impl FallbackEncoding {
    /// Decodes a byte slice under this encoding. Never fails: every byte
    /// sequence is valid in both supported encodings.
    #[must_use]
    pub fn decode(self, bytes: &[u8]) -> String {
        match self {
            Self::Latin1 => bytes.iter().map(|&b| char::from(b)).collect(),
            Self::Windows1252 => bytes.iter().map(|&b| windows_1252_char(b)).collect(),
        }
    }
}

/// Maps a Windows-1252 byte to its character.
///
/// Identical to Latin-1 outside 0x80..=0x9F; the five unassigned bytes in
/// that range fall back to their Latin-1 control characters.
const fn windows_1252_char(byte: u8) -> char {
    match byte {
        0x80 => '\u{20AC}',
        0x82 => '\u{201A}',
        0x83 => '\u{0192}',
        0x84 => '\u{201E}',
        0x85 => '\u{2026}',
        0x86 => '\u{2020}',
        0x87 => '\u{2021}',
        0x88 => '\u{02C6}',
        0x89 => '\u{2030}',
        0x8A => '\u{0160}',
        0x8B => '\u{2039}',
        0x8C => '\u{0152}',
        0x8E => '\u{017D}',
        0x91 => '\u{2018}',
        0x92 => '\u{2019}',
        0x93 => '\u{201C}',
        0x94 => '\u{201D}',
        0x95 => '\u{2022}',
        0x96 => '\u{2013}',
        0x97 => '\u{2014}',
        0x98 => '\u{02DC}',
        0x99 => '\u{2122}',
        0x9A => '\u{0161}',
        0x9B => '\u{203A}',
        0x9C => '\u{0153}',
        0x9E => '\u{017E}',
        0x9F => '\u{0178}',
        other => other as char,
    }
}

/// Accepted header labels per canonical field, pre-folded.
///
/// Labels must already be accent-folded and lower-cased; the fitter folds
/// incoming headers before comparing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasTable {
    aliases: Vec<(CanonicalField, Vec<String>)>,
}

impl AliasTable {
    /// Builds an alias table from explicit entries.
    #[must_use]
    pub const fn new(aliases: Vec<(CanonicalField, Vec<String>)>) -> Self {
        Self { aliases }
    }

    /// The standard table covering the Spanish and English header variants
    /// seen in survey exports.
    #[must_use]
    pub fn standard() -> Self {
        let table: Vec<(CanonicalField, Vec<&str>)> = vec![
            (
                CanonicalField::FullName,
                vec![
                    "nombre completo",
                    "nombre y apellido",
                    "nombres y apellidos",
                    "apellidos y nombres",
                    "nombre del participante",
                    "nombre del estudiante",
                    "nombre",
                    "nombres",
                    "participante",
                    "estudiante",
                    "full name",
                    "name",
                ],
            ),
            (
                CanonicalField::NationalId,
                vec![
                    "rut",
                    "run",
                    "cedula",
                    "cedula de identidad",
                    "carnet de identidad",
                    "documento",
                    "documento de identidad",
                    "numero de documento",
                    "rut o cedula",
                    "identificacion",
                ],
            ),
            (
                CanonicalField::InstitutionalEmail,
                vec![
                    "correo institucional",
                    "email institucional",
                    "correo universitario",
                    "email universitario",
                    "correo estudiantil",
                    "correo electronico",
                    "correo",
                    "email",
                    "e-mail",
                    "mail",
                ],
            ),
            (
                CanonicalField::ProgramOrArea,
                vec![
                    "carrera",
                    "carrera universitaria",
                    "programa",
                    "programa de estudios",
                    "programa academico",
                    "area",
                    "area de estudios",
                    "especialidad",
                    "unidad",
                    "departamento",
                    "que estudias",
                ],
            ),
            (
                CanonicalField::Phone,
                vec![
                    "telefono",
                    "telefono movil",
                    "telefono celular",
                    "telefono de contacto",
                    "celular",
                    "movil",
                    "numero de telefono",
                    "numero de celular",
                    "numero de contacto",
                    "contacto",
                    "phone",
                ],
            ),
        ];

        Self {
            aliases: table
                .into_iter()
                .map(|(field, labels)| {
                    (
                        field,
                        labels.into_iter().map(String::from).collect::<Vec<String>>(),
                    )
                })
                .collect(),
        }
    }

    /// The accepted labels for a canonical field.
    #[must_use]
    pub fn labels(&self, field: CanonicalField) -> &[String] {
        self.aliases
            .iter()
            .find(|(candidate, _)| *candidate == field)
            .map_or(&[], |(_, labels)| labels.as_slice())
    }
}

impl Default for AliasTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// The options the pipeline consumes.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestConfig {
    /// Similarity cutoff (0..100) for enqueueing duplicate-review pairs.
    pub review_threshold: f64,
    /// Accepted email domain suffixes; other domains are tagged
    /// `email.non_institutional`.
    pub institution_email_suffixes: Vec<String>,
    /// Encoding tried when UTF-8 decoding fails.
    pub default_encoding_fallback: FallbackEncoding,
    /// Maximum data rows per upload batch.
    pub ingest_row_limit: usize,
    /// Accepted header labels per canonical field.
    pub alias_table: AliasTable,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            review_threshold: 88.0,
            institution_email_suffixes: Vec::new(),
            default_encoding_fallback: FallbackEncoding::Latin1,
            ingest_row_limit: 20_000,
            alias_table: AliasTable::standard(),
        }
    }
}
