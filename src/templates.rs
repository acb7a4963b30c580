//! Template Content Composer
//!
//! Localized body templates are contracts: `compose` is a pure function over
//! a closed language set, so the same `(title, language)` pair always renders
//! identical text. Languages without a localized template render with the
//! default language's template.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Supported content languages. The default is English; unrecognized
/// language strings parse to the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Language {
    English,
    Hindi,
    Spanish,
    French,
    German,
    Japanese,
    Chinese,
    Arabic,
    Portuguese,
}

impl Default for Language {
    fn default() -> Self {
        Self::English
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Language::English => "English",
            Language::Hindi => "Hindi",
            Language::Spanish => "Spanish",
            Language::French => "French",
            Language::German => "German",
            Language::Japanese => "Japanese",
            Language::Chinese => "Chinese",
            Language::Arabic => "Arabic",
            Language::Portuguese => "Portuguese",
        };
        write!(f, "{}", name)
    }
}

impl Language {
    /// All supported languages, in display order.
    pub const ALL: [Language; 9] = [
        Language::English,
        Language::Hindi,
        Language::Spanish,
        Language::French,
        Language::German,
        Language::Japanese,
        Language::Chinese,
        Language::Arabic,
        Language::Portuguese,
    ];

    /// Lenient parse: unknown values fall back to the default language.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "english" => Language::English,
            "hindi" => Language::Hindi,
            "spanish" => Language::Spanish,
            "french" => Language::French,
            "german" => Language::German,
            "japanese" => Language::Japanese,
            "chinese" => Language::Chinese,
            "arabic" => Language::Arabic,
            "portuguese" => Language::Portuguese,
            _ => Language::default(),
        }
    }

    /// The localized template for this language, if one exists.
    fn localized(self) -> Option<&'static str> {
        match self {
            Language::English => Some(ENGLISH_TEMPLATE),
            Language::Spanish => Some(SPANISH_TEMPLATE),
            Language::Hindi => Some(HINDI_TEMPLATE),
            _ => None,
        }
    }
}

/// Render the structured body text for `title` in `language`.
///
/// Pure and deterministic: no I/O, no clock. `title` is interpolated
/// verbatim at the template's designated points.
pub fn compose(title: &str, language: Language) -> String {
    let template = language.localized().unwrap_or(ENGLISH_TEMPLATE);
    template.replace("{title}", title)
}

/// Error produced by a failing [`ContentComposer`] implementation.
///
/// The built-in [`TemplateComposer`] never fails; the type exists so the
/// workflow's no-partial-artifact guarantee stays testable.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct ComposeError(pub String);

/// Seam for body-text composition during content assembly.
pub trait ContentComposer {
    fn compose(&self, title: &str, language: Language) -> Result<String, ComposeError>;
}

/// The default composer backed by the localized templates.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateComposer;

impl ContentComposer for TemplateComposer {
    fn compose(&self, title: &str, language: Language) -> Result<String, ComposeError> {
        Ok(compose(title, language))
    }
}

const ENGLISH_TEMPLATE: &str = r#"# {title}

## Engaging Social Media Content

**Primary Post:**
🎯 {title} - Transform your content strategy with AI-powered insights!

**Key Points:**
• Automated content generation
• Multi-platform optimization
• Real-time performance analytics
• Blockchain verification

**Hashtags:**
#AI #ContentCreation #DigitalMarketing #Innovation

**Call to Action:**
👉 Ready to revolutionize your content workflow? Start creating today!"#;

const SPANISH_TEMPLATE: &str = r#"# {title}

## Contenido para Redes Sociales

**Publicación Principal:**
🎯 {title} - ¡Transforma tu estrategia de contenido con ideas impulsadas por IA!

**Puntos Clave:**
• Generación automática de contenido
• Optimización multiplataforma
• Análisis de rendimiento en tiempo real
• Verificación blockchain

**Hashtags:**
#IA #CreaciónDeContenido #MarketingDigital #Innovación

**Llamada a la Acción:**
👉 ¿Listo para revolucionar tu flujo de trabajo? ¡Comienza a crear hoy!"#;

const HINDI_TEMPLATE: &str = r#"# {title}

## सोशल मीडिया कंटेंट

**मुख्य पोस्ट:**
🎯 {title} - AI-पावर्ड इनसाइट्स के साथ अपनी कंटेंट स्ट्रैटेजी को बदलें!

**मुख्य बिंदु:**
• ऑटोमेटेड कंटेंट जनरेशन
• मल्टी-प्लेटफॉर्म ऑप्टिमाइजेशन
• रियल-टाइम परफॉर्मेंस एनालिटिक्स
• ब्लॉकचेन वेरिफिकेशन

**हैशटैग:**
#AI #कंटेंटक्रिएशन #डिजिटलमार्केटिंग #इनोवेशन

**कॉल टू एक्शन:**
👉 अपनी कंटेंट वर्कफ़्लो में क्रांति लाने के लिए तैयार हैं? आज ही शुरू करें!"#;
