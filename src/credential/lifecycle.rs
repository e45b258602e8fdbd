//! Credential acquisition at startup and the social-login redirect.

use derive_getters::Getters;
use reqwest::Url;
use strum::{Display, EnumIter, EnumString};
use tracing::{debug, info, instrument, warn};

use crate::session::GameSession;

/// Query parameter the login redirect attaches the credential to.
pub const TOKEN_QUERY_PARAM: &str = "token";

/// Error returned when a landing URL cannot be parsed.
pub type UrlParseError = <Url as std::str::FromStr>::Err;

/// External identity providers offered by the authority.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString, clap::ValueEnum,
)]
#[strum(serialize_all = "lowercase")]
pub enum LoginProvider {
    /// Google sign-in.
    Google,
    /// Facebook sign-in.
    Facebook,
}

impl LoginProvider {
    /// Button label shown in the UI.
    pub fn label(self) -> &'static str {
        match self {
            Self::Google => "Log in with Google",
            Self::Facebook => "Log in with Facebook",
        }
    }
}

/// URL that starts the redirect login flow for `provider`.
///
/// This is navigated to directly, never called through the API client.
#[instrument]
pub fn login_url(api_base_url: &str, provider: LoginProvider) -> String {
    format!("{}/api/auth/{}", api_base_url.trim_end_matches('/'), provider)
}

/// Splits a landing URL into the credential it carries (if any) and the
/// same URL with the credential parameter removed.
///
/// Other query parameters are preserved.
#[instrument(skip(landing_url))]
pub fn take_token(landing_url: &str) -> Result<(Option<String>, String), UrlParseError> {
    let mut url = Url::parse(landing_url)?;

    let mut token = None;
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter_map(|(key, value)| {
            if key == TOKEN_QUERY_PARAM {
                token = Some(value.into_owned());
                None
            } else {
                Some((key.into_owned(), value.into_owned()))
            }
        })
        .collect();

    if kept.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(kept);
    }

    debug!(found = token.is_some(), "Inspected landing URL");
    Ok((token, url.to_string()))
}

/// Where the startup credential came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum CredentialSource {
    /// Passed on the command line after the login redirect.
    LandingUrl,
    /// Pasted directly with `--token`.
    Explicit,
    /// Recovered from durable storage.
    Stored,
    /// Nothing found; the UI stays locked.
    None,
}

/// Result of the startup credential check.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct Bootstrap {
    /// Where the credential came from.
    source: CredentialSource,
    /// Landing URL with the credential stripped, when one was given.
    cleaned_location: Option<String>,
}

/// One-shot startup credential check.
///
/// The UI shows a loading state until [`CredentialLifecycle::is_loaded`]
/// turns `true`, so a recovered credential never flashes the logged-out
/// screen.
#[derive(Debug, Default)]
pub struct CredentialLifecycle {
    loaded: bool,
}

impl CredentialLifecycle {
    /// Creates a lifecycle that has not run yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the startup check has completed.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Runs the startup check once.
    ///
    /// Adopts a credential from the landing URL, then from `explicit_token`,
    /// then from durable storage. Adopted credentials are persisted through
    /// [`GameSession::load_credential`]. Later calls return `None` and leave
    /// the session alone.
    #[instrument(skip_all)]
    pub fn bootstrap(
        &mut self,
        session: &mut GameSession,
        landing_url: Option<&str>,
        explicit_token: Option<&str>,
    ) -> Option<Bootstrap> {
        if self.loaded {
            debug!("Credential bootstrap already ran");
            return None;
        }
        self.loaded = true;

        let mut cleaned_location = None;

        if let Some(landing) = landing_url {
            match take_token(landing) {
                Ok((token, cleaned)) => {
                    cleaned_location = Some(cleaned);
                    if let Some(token) = token
                        && session.load_credential(&token).is_ok()
                    {
                        info!("Adopted credential from landing URL");
                        return Some(Bootstrap {
                            source: CredentialSource::LandingUrl,
                            cleaned_location,
                        });
                    }
                }
                Err(e) => warn!(error = %e, "Ignoring unparseable landing URL"),
            }
        }

        if let Some(token) = explicit_token
            && session.load_credential(token).is_ok()
        {
            info!("Adopted explicit credential");
            return Some(Bootstrap {
                source: CredentialSource::Explicit,
                cleaned_location,
            });
        }

        let source = if session.recover_credential() {
            CredentialSource::Stored
        } else {
            info!("No credential available, UI locked");
            CredentialSource::None
        };

        Some(Bootstrap {
            source,
            cleaned_location,
        })
    }
}
