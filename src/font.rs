//! System font lookup for the card and QR label renderers.
//!
//! The font database is loaded once per process. Lookups walk a fallback
//! chain of generic families so a card can still be produced on hosts where
//! the preferred family is missing. Hosts with no fonts at all get a typed
//! [`Error::Font`] instead of a broken image.

use crate::error::{Error, Result};
use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use rusttype::Font;
use std::{
    collections::HashMap,
    fs,
    sync::{Mutex, OnceLock},
};

fn db() -> &'static Database {
    static DB: OnceLock<Database> = OnceLock::new();
    DB.get_or_init(|| {
        let mut db = Database::new();
        db.load_system_fonts();
        db
    })
}

/// Resolves a font by family name, falling back through the generic
/// sans-serif, serif, and monospace families.
///
/// Resolved fonts are leaked into a process-wide cache; the handful of
/// families a run can touch makes that bounded.
///
/// # Errors
///
/// Returns [`Error::Font`] when no face on the host satisfies any family in
/// the chain.
pub(crate) fn resolve(family: &str) -> Result<&'static Font<'static>> {
    static CACHE: OnceLock<Mutex<HashMap<String, &'static Font<'static>>>> = OnceLock::new();
    let cache = CACHE.get_or_init(|| Mutex::new(HashMap::new()));

    if let Some(font) = cache
        .lock()
        .unwrap_or_else(|p| p.into_inner())
        .get(family)
    {
        return Ok(font);
    }

    let font = load_from_system(family)
        .ok_or_else(|| Error::font(format!("no usable font found for family '{family}'")))?;
    let font_ref: &'static Font<'static> = Box::leak(Box::new(font));

    cache
        .lock()
        .unwrap_or_else(|p| p.into_inner())
        .insert(family.to_string(), font_ref);
    Ok(font_ref)
}

fn load_from_system(family: &str) -> Option<Font<'static>> {
    let mut families: Vec<Family<'_>> = match family.trim() {
        "" | "Sans" => vec![],
        "Serif" => vec![Family::Serif],
        "Monospace" => vec![Family::Monospace],
        other => vec![Family::Name(other)],
    };
    families.extend([Family::SansSerif, Family::Serif, Family::Monospace]);

    let query = Query {
        families: &families,
        weight: Weight::NORMAL,
        stretch: Stretch::Normal,
        style: Style::Normal,
    };

    let id = db().query(&query).or_else(|| {
        // Last resort: any face the database knows about.
        db().faces().next().map(|face| face.id)
    })?;
    let face = db().face(id)?;

    match &face.source {
        fontdb::Source::File(path) => {
            let bytes = fs::read(path).ok()?;
            Font::try_from_vec(bytes)
        }
        fontdb::Source::SharedFile(path, _) => {
            let bytes = fs::read(path).ok()?;
            Font::try_from_vec(bytes)
        }
        fontdb::Source::Binary(bytes) => Font::try_from_vec(bytes.as_ref().as_ref().to_vec()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_is_cached() {
        // Hosts without any installed font legitimately fail here.
        let Ok(first) = resolve("Sans") else { return };
        let second = resolve("Sans").unwrap();
        assert!(std::ptr::eq(first, second));
    }

    #[test]
    fn test_unknown_family_falls_back() {
        let Ok(_) = resolve("Sans") else { return };
        // With at least one font installed, a bogus family must still resolve.
        assert!(resolve("No Such Family 42").is_ok());
    }
}
