use color_eyre::eyre::eyre;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::errors::LookupError;

/// Fields pulled out of an explorer token page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenInfo {
    /// The token address as the page displays it.
    pub token: String,
    /// The standard label, e.g. `[ERC-20]`.
    pub token_type: String,
}

/// Known page layouts, newest last.
///
/// When the explorer changes its markup, add a profile here instead of
/// editing an existing one, so deployments can pin the layout they expect.
const PROFILES: &[(&str, &str, &str)] = &[(
    "etherscan-v1",
    "div[class='col-md-6'] a[class='text-truncate d-block mr-2']",
    "h2[class='card-header-title'] span[class='text-secondary small']",
)];

/// A named pair of compiled selectors describing where the token address
/// and the token standard live on the page.
#[derive(Debug, Clone)]
pub struct SelectorProfile {
    name: String,
    address: Selector,
    standard: Selector,
}

impl SelectorProfile {
    pub const DEFAULT: &'static str = "etherscan-v1";

    /// Looks up and compiles a built-in profile by name.
    pub fn named(name: &str) -> color_eyre::Result<Self> {
        let (name, address, standard) = PROFILES
            .iter()
            .find(|(profile, _, _)| *profile == name)
            .ok_or_else(|| {
                let known: Vec<_> = PROFILES.iter().map(|(profile, _, _)| *profile).collect();
                eyre!("Unknown selector profile {name:?}, expected one of {known:?}")
            })?;

        Self::compile(name, address, standard)
    }

    pub fn compile(name: &str, address: &str, standard: &str) -> color_eyre::Result<Self> {
        Ok(Self {
            name: name.to_string(),
            address: parse_selector(address)?,
            standard: parse_selector(standard)?,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Extracts the token address and standard from a raw page body.
    ///
    /// All address matches come first, then all standard matches, and the
    /// page is only accepted when exactly two non-empty texts were found.
    /// Document order never affects which text becomes which field.
    ///
    /// Bytes that are not valid UTF-8 are replaced rather than rejected;
    /// the HTML parser accepts any input.
    pub fn extract(&self, body: &[u8]) -> Result<TokenInfo, LookupError> {
        let html = String::from_utf8_lossy(body);
        let document = Html::parse_document(&html);

        let mut texts: Vec<String> = document
            .select(&self.address)
            .chain(document.select(&self.standard))
            .filter_map(element_text)
            .collect();

        debug!(
            profile = %self.name,
            matches = texts.len(),
            "Extracted texts from token page"
        );

        if texts.len() != 2 {
            return Err(LookupError::SchemaMismatch { found: texts.len() });
        }

        let token_type = texts.pop().unwrap_or_default();
        let token = texts.pop().unwrap_or_default();

        Ok(TokenInfo { token, token_type })
    }
}

fn parse_selector(css: &str) -> color_eyre::Result<Selector> {
    Selector::parse(css).map_err(|e| eyre!("Invalid selector {css:?}: {e}"))
}

/// Text is kept as the page has it; only a match with no text at all is
/// skipped.
fn element_text(element: ElementRef<'_>) -> Option<String> {
    let text = element.text().collect::<String>();

    (!text.is_empty()).then_some(text)
}
