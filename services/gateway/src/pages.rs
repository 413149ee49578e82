//! Server-rendered HTML pages.
//!
//! Templates are compiled into the binary and rendered with `tera`. Every
//! template is registered with an `.html` name, so all interpolated values
//! are escaped.

use crate::catalog_client::CatalogEntry;
use crate::session::Session;
use serde::Serialize;
use session_token::TokenPayload;
use tera::{Context, Tera};

/// Notice shown when the catalog cannot be fetched.
pub const CATALOG_UNAVAILABLE: &str = "Catalog temporarily unavailable";

/// Shown in place of a paid-only link for other users.
pub const PAID_ONLY_MARKER: &str = "paid subscribers only";

const CATALOG: &str = "catalog.html";
const LOGIN: &str = "login.html";

const TEMPLATES: [(&str, &str); 3] = [
    ("base.html", include_str!("../templates/base.html")),
    (CATALOG, include_str!("../templates/catalog.html")),
    (LOGIN, include_str!("../templates/login.html")),
];

#[derive(Serialize)]
struct EntryView<'a> {
    name: &'a str,
    poster_path: &'a str,
    link: Option<&'a str>,
}

#[derive(Serialize)]
struct CatalogView<'a> {
    user: Option<&'a TokenPayload>,
    available: bool,
    entries: Vec<EntryView<'a>>,
    paid_only_marker: &'static str,
    unavailable_notice: &'static str,
}

#[derive(Serialize)]
struct LoginView<'a> {
    user: Option<&'a TokenPayload>,
    message: Option<&'a str>,
}

/// Compiled page templates.
#[derive(Debug)]
pub struct Pages {
    tera: Tera,
}

impl Pages {
    /// Compile the built-in templates.
    ///
    /// # Errors
    ///
    /// Returns an error if a template does not parse.
    pub fn new() -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![".html"]);
        tera.add_raw_templates(TEMPLATES)?;
        Ok(Self { tera })
    }

    /// Catalog page. `entries` is `None` when the catalog could not be
    /// fetched.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails.
    pub fn catalog(
        &self,
        session: &Session,
        entries: Option<&[CatalogEntry]>,
    ) -> Result<String, tera::Error> {
        let entries = entries.map(|entries| {
            entries
                .iter()
                .map(|entry| EntryView {
                    name: &entry.name,
                    poster_path: &entry.poster_path,
                    link: (!entry.is_paid_only || session.is_paid())
                        .then_some(entry.external_url.as_str()),
                })
                .collect::<Vec<_>>()
        });
        self.render(
            CATALOG,
            &CatalogView {
                user: session.user(),
                available: entries.is_some(),
                entries: entries.unwrap_or_default(),
                paid_only_marker: PAID_ONLY_MARKER,
                unavailable_notice: CATALOG_UNAVAILABLE,
            },
        )
    }

    /// Login page with an optional message above the form. When `user` is
    /// set the page greets them instead of asking to log in.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails.
    pub fn login(
        &self,
        user: Option<&TokenPayload>,
        message: Option<&str>,
    ) -> Result<String, tera::Error> {
        self.render(LOGIN, &LoginView { user, message })
    }

    fn render<T: Serialize>(&self, name: &str, view: &T) -> Result<String, tera::Error> {
        self.tera.render(name, &Context::from_serialize(view)?)
    }
}
