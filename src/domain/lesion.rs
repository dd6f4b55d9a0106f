//! Lesion categories recognised by the classification model.
//!
//! Keys follow the HAM10000 dataset abbreviations.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LesionType {
    Akiec,
    Bcc,
    Bkl,
    Df,
    Mel,
    Nv,
    Vasc,
}

impl LesionType {
    pub const ALL: [LesionType; 7] = [
        LesionType::Akiec,
        LesionType::Bcc,
        LesionType::Bkl,
        LesionType::Df,
        LesionType::Mel,
        LesionType::Nv,
        LesionType::Vasc,
    ];

    /// Short dataset key, e.g. `mel`.
    #[must_use]
    pub fn key(&self) -> &'static str {
        match self {
            Self::Akiec => "akiec",
            Self::Bcc => "bcc",
            Self::Bkl => "bkl",
            Self::Df => "df",
            Self::Mel => "mel",
            Self::Nv => "nv",
            Self::Vasc => "vasc",
        }
    }

    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.key() == key)
    }

    #[must_use]
    pub fn full_name(&self) -> &'static str {
        match self {
            Self::Akiec => "Actinic Keratoses / Intraepithelial Carcinoma",
            Self::Bcc => "Basal Cell Carcinoma",
            Self::Bkl => "Benign Keratosis",
            Self::Df => "Dermatofibroma",
            Self::Mel => "Melanoma",
            Self::Nv => "Melanocytic Nevus",
            Self::Vasc => "Vascular Lesion",
        }
    }

    /// Whether the category is malignant or pre-malignant.
    #[must_use]
    pub fn is_malignant(&self) -> bool {
        matches!(self, Self::Akiec | Self::Bcc | Self::Mel)
    }

    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Akiec => {
                "Rough, scaly patches caused by long-term sun exposure. Some progress to squamous cell carcinoma, so they are usually treated early."
            }
            Self::Bcc => {
                "The most common skin cancer. Grows slowly and rarely spreads, but can damage surrounding tissue if left untreated."
            }
            Self::Bkl => {
                "Non-cancerous growths such as seborrheic keratoses and solar lentigines. Often waxy or 'stuck-on' in appearance."
            }
            Self::Df => {
                "A small, firm, benign nodule, commonly on the legs. Dimples inward when pinched."
            }
            Self::Mel => {
                "A cancer of pigment-producing cells. Less common but the most dangerous skin cancer; early detection greatly improves outcomes."
            }
            Self::Nv => {
                "Common moles. Benign clusters of melanocytes; changes in size, shape or colour should be checked by a dermatologist."
            }
            Self::Vasc => {
                "Lesions of blood vessels such as cherry angiomas and angiokeratomas. Typically red or purple and benign."
            }
        }
    }
}

impl std::fmt::Display for LesionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.full_name(), self.key())
    }
}
