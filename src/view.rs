use std::error::Error;
use std::fmt::Write as _;

use crate::grouping::ItemGroup;
use crate::sync::Snapshot;

pub const LOADING_TEXT: &str = "Loading...";
pub const EMPTY_TEXT: &str = "Nothing yet.";

/// A presentation skin over the reconciled list
///
/// Skins only read the snapshot; they never touch the controller.
pub trait ListView {
    fn render(&self, snapshot: &Snapshot) -> Result<String, Box<dyn Error + Send + Sync>>;
}

/// What the list area should show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListBody<'a> {
    Loading,
    Empty,
    Groups(&'a [ItemGroup]),
}

impl<'a> ListBody<'a> {
    pub fn of(snapshot: &'a Snapshot) -> Self {
        if snapshot.loading && snapshot.records.is_empty() {
            ListBody::Loading
        } else if snapshot.groups.is_empty() {
            ListBody::Empty
        } else {
            ListBody::Groups(&snapshot.groups)
        }
    }
}

/// Plain text rendering for terminals
#[derive(Debug, Default, Clone, Copy)]
pub struct TextView;

impl ListView for TextView {
    fn render(&self, snapshot: &Snapshot) -> Result<String, Box<dyn Error + Send + Sync>> {
        let mut out = String::new();

        match ListBody::of(snapshot) {
            ListBody::Loading => writeln!(out, "{LOADING_TEXT}")?,
            ListBody::Empty => writeln!(out, "{EMPTY_TEXT}")?,
            ListBody::Groups(groups) => {
                for group in groups {
                    if group.qty.is_empty() {
                        writeln!(out, "{}", group.item)?;
                    } else {
                        writeln!(out, "{} ({})", group.item, group.qty)?;
                    }
                    for person in &group.people {
                        writeln!(out, "  - {}", person.label())?;
                    }
                }
            }
        }

        if snapshot.refreshing {
            writeln!(out, "(refreshing)")?;
        }
        if let Some(error) = &snapshot.error {
            writeln!(out, "! {error}")?;
        }
        Ok(out)
    }
}

#[cfg(feature = "web")]
pub use html::{HtmlView, list_data};

#[cfg(feature = "web")]
mod html {
    use std::error::Error;

    use handlebars::Handlebars;
    use serde_json::{Value, json};

    use super::{EMPTY_TEXT, LOADING_TEXT, ListBody, ListView};
    use crate::record::Submission;
    use crate::sync::Snapshot;

    const PAGE: &str = "page";

    /// The shared part of the page: list, placeholder and status flags.
    ///
    /// Served as is by the polling endpoint, so it never carries a form or
    /// an error belonging to one visitor.
    pub fn list_data(snapshot: &Snapshot) -> Value {
        let (placeholder, groups): (&str, Vec<Value>) = match ListBody::of(snapshot) {
            ListBody::Loading => (LOADING_TEXT, Vec::new()),
            ListBody::Empty => (EMPTY_TEXT, Vec::new()),
            ListBody::Groups(groups) => (
                "",
                groups
                    .iter()
                    .map(|g| {
                        json!({
                            "item": g.item,
                            "qty": g.qty,
                            "people": g.people.iter().map(|p| p.label()).collect::<Vec<_>>(),
                        })
                    })
                    .collect(),
            ),
        };

        json!({
            "records": snapshot.records,
            "placeholder": placeholder,
            "groups": groups,
            "loading": snapshot.loading,
            "refreshing": snapshot.refreshing,
            "submitting": snapshot.submitting,
        })
    }

    /// Server-rendered page for browsers
    pub struct HtmlView {
        registry: Handlebars<'static>,
        poll_secs: u64,
    }

    impl HtmlView {
        pub fn new(poll_secs: u64) -> Result<Self, Box<dyn Error + Send + Sync>> {
            let mut registry = Handlebars::new();
            registry.register_template_string(PAGE, include_str!("../templates/page.hbs"))?;
            Ok(HtmlView {
                registry,
                poll_secs,
            })
        }

        /// Render the page for one request, with that request's form and error.
        pub fn render_page(
            &self,
            snapshot: &Snapshot,
            form: &Submission,
            error: Option<&str>,
        ) -> Result<String, Box<dyn Error + Send + Sync>> {
            let data = json!({
                "poll_ms": self.poll_secs.saturating_mul(1000),
                "list": list_data(snapshot),
                "form": form,
                "error": error.unwrap_or_default(),
            });

            Ok(self.registry.render(PAGE, &data)?)
        }
    }

    impl ListView for HtmlView {
        /// A blank form, as a new visitor sees it
        fn render(&self, snapshot: &Snapshot) -> Result<String, Box<dyn Error + Send + Sync>> {
            self.render_page(snapshot, &Submission::default(), None)
        }
    }
}
