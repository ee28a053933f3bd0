//! Link activation routing.
//!
//! Every click reaching the document is reduced to a [`LinkActivation`] and
//! routed by [`classify`]. Only plain clicks on same-site links that leave the
//! current document start a warp; everything else is left to the browser or
//! scrolls in place.

use url::Url;

/// What the document-level click handler saw.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LinkActivation {
	/// Raw `href` attribute, as authored.
	pub href: String,
	/// `MouseEvent.button` (0 = primary).
	pub button: i16,
	/// Control key held.
	pub ctrl: bool,
	/// Meta (command) key held.
	pub meta: bool,
	/// Shift key held.
	pub shift: bool,
	/// Alt (option) key held.
	pub alt: bool,
	/// `target` attribute, if any.
	pub target: Option<String>,
	/// Whether the anchor carries a `download` attribute.
	pub download: bool,
	/// Whether another handler already called `preventDefault`.
	pub default_prevented: bool,
}

impl LinkActivation {
	/// A plain primary-button click on `href`.
	pub fn click(href: impl Into<String>) -> Self {
		Self {
			href: href.into(),
			..Self::default()
		}
	}

	fn is_modified(&self) -> bool {
		let new_context = self
			.target
			.as_deref()
			.map(str::trim)
			.is_some_and(|t| !t.is_empty() && !t.eq_ignore_ascii_case("_self"));

		self.button != 0
			|| self.ctrl
			|| self.meta
			|| self.shift
			|| self.alt
			|| new_context
			|| self.download
	}
}

/// How a link activation is handled.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LinkAction {
	/// Let the browser do its default thing.
	Default,
	/// Prevent default and scroll to the element with this id (empty = top).
	ScrollTo(String),
	/// Prevent default and warp to this href.
	Warp(String),
}

/// Routes a link activation, first matching rule wins:
/// modified click, in-page fragment, external or scheme link, fragment of the
/// current document, same-site page.
///
/// `current` is the page's own URL. Without it, relative links that only differ
/// in their fragment cannot be recognized and warp like any other page.
pub fn classify(link: &LinkActivation, current: Option<&Url>) -> LinkAction {
	if link.default_prevented || link.is_modified() {
		return LinkAction::Default;
	}

	let href = link.href.trim();
	if href.is_empty() {
		return LinkAction::Default;
	}

	if let Some(fragment) = href.strip_prefix('#') {
		return LinkAction::ScrollTo(fragment.to_string());
	}

	if is_external(href) {
		return LinkAction::Default;
	}

	if let Some(fragment) = current.and_then(|page| same_document_fragment(page, href)) {
		return LinkAction::ScrollTo(fragment);
	}

	LinkAction::Warp(href.to_string())
}

/// The fragment of `href` if it resolves to `page` apart from the fragment.
/// Following such a link never unloads the page.
fn same_document_fragment(page: &Url, href: &str) -> Option<String> {
	let mut resolved = page.join(href).ok()?;
	let fragment = resolved.fragment()?.to_string();
	let mut page = page.clone();
	resolved.set_fragment(None);
	page.set_fragment(None);
	(resolved == page).then_some(fragment)
}

/// Absolute URLs (`https://`, `mailto:`, `tel:`, ...) and protocol-relative
/// `//host/...` references.
fn is_external(href: &str) -> bool {
	href.starts_with("//") || has_scheme(href)
}

/// RFC 3986 scheme: a letter, then letters, digits, `+`, `-` or `.`, then `:`
/// before any `/`, `?` or `#`.
fn has_scheme(href: &str) -> bool {
	let Some(colon) = href.find(':') else {
		return false;
	};
	let scheme = &href[..colon];
	let mut chars = scheme.chars();
	let Some(first) = chars.next() else {
		return false;
	};
	first.is_ascii_alphabetic()
		&& chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

#[cfg(test)]
mod tests {
	use super::*;

	fn route(href: &str) -> LinkAction {
		classify(&LinkActivation::click(href), None)
	}

	fn route_from(page: &str, href: &str) -> LinkAction {
		let page = Url::parse(page).expect("valid page url");
		classify(&LinkActivation::click(href), Some(&page))
	}

	#[test]
	fn same_site_paths_warp() {
		assert_eq!(route("/about"), LinkAction::Warp("/about".into()));
		assert_eq!(route("posts/one.html"), LinkAction::Warp("posts/one.html".into()));
		assert_eq!(route("../index.html?x=1#top"), LinkAction::Warp("../index.html?x=1#top".into()));
		assert_eq!(route("  /trimmed "), LinkAction::Warp("/trimmed".into()));
		// Colon after a slash is part of the path, not a scheme.
		assert_eq!(route("/a:b"), LinkAction::Warp("/a:b".into()));
	}

	#[test]
	fn fragments_scroll_in_place() {
		assert_eq!(route("#contact"), LinkAction::ScrollTo("contact".into()));
		assert_eq!(route("#"), LinkAction::ScrollTo(String::new()));
	}

	#[test]
	fn external_and_scheme_links_are_left_alone() {
		for href in [
			"https://example.com/",
			"http://example.com",
			"//cdn.example.com/x",
			"mailto:hi@example.com",
			"tel:+123",
			"javascript:void(0)",
			"",
		] {
			assert_eq!(route(href), LinkAction::Default, "{href}");
		}
	}

	#[test]
	fn modified_clicks_are_left_alone() {
		let base = LinkActivation::click("/about");
		let cases = [
			LinkActivation { button: 1, ..base.clone() },
			LinkActivation { ctrl: true, ..base.clone() },
			LinkActivation { meta: true, ..base.clone() },
			LinkActivation { shift: true, ..base.clone() },
			LinkActivation { alt: true, ..base.clone() },
			LinkActivation { target: Some("_blank".into()), ..base.clone() },
			LinkActivation { download: true, ..base.clone() },
			LinkActivation { default_prevented: true, ..base.clone() },
		];
		for case in &cases {
			assert_eq!(classify(case, None), LinkAction::Default, "{case:?}");
		}
	}

	#[test]
	fn self_target_is_not_a_new_tab() {
		let link = LinkActivation {
			target: Some("_self".into()),
			..LinkActivation::click("/about")
		};
		assert_eq!(classify(&link, None), LinkAction::Warp("/about".into()));

		// Modifier checks come before fragment handling.
		let link = LinkActivation {
			ctrl: true,
			..LinkActivation::click("#contact")
		};
		assert_eq!(classify(&link, None), LinkAction::Default);
	}

	#[test]
	fn fragment_of_current_page_scrolls_instead_of_warping() {
		let page = "https://site.test/blog/index.html";
		assert_eq!(
			route_from(page, "index.html#contact"),
			LinkAction::ScrollTo("contact".into())
		);
		assert_eq!(
			route_from(page, "/blog/index.html#top"),
			LinkAction::ScrollTo("top".into())
		);
		assert_eq!(route_from(page, "index.html#"), LinkAction::ScrollTo(String::new()));
		assert_eq!(
			route_from("https://site.test/blog/index.html#old", "index.html#new"),
			LinkAction::ScrollTo("new".into())
		);
	}

	#[test]
	fn other_documents_still_warp() {
		let page = "https://site.test/blog/index.html";
		// Same path without a fragment reloads the page.
		assert_eq!(route_from(page, "index.html"), LinkAction::Warp("index.html".into()));
		assert_eq!(
			route_from(page, "about.html#team"),
			LinkAction::Warp("about.html#team".into())
		);
		assert_eq!(
			route_from(page, "index.html?page=2#list"),
			LinkAction::Warp("index.html?page=2#list".into())
		);
	}
}
