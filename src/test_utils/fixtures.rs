use std::sync::Arc;

use crate::app::AppContext;
use crate::cache::SharedTier;
use crate::config::Config;
use crate::error::Result;
use crate::storage::{Database, LocationDraft};

/// `(name, district, area)`
pub const SAMPLE_LOCATIONS: [(&str, &str, &str); 5] = [
    ("جامع الراجحي", "الجزيرة", "شرق"),
    ("جامع الملك خالد", "أم الحمام", "غرب"),
    ("جامع الشيخ عبدالعزيز بن باز", "الملقا", "شمال"),
    ("جامع الأميرة سارة", "الياسمين", "شمال"),
    ("جامع العثيم", "النسيم", "شرق"),
];

/// `(name, index into SAMPLE_LOCATIONS)`
pub const SAMPLE_ENTRIES: [(&str, Option<usize>); 10] = [
    ("خالد الجليل", Some(1)),
    ("ماهر المعيقلي", None),
    ("ياسر الدوسري", Some(0)),
    ("عبدالرحمن السديس", None),
    ("محمد اللحيدان", Some(2)),
    ("ناصر القطامي", Some(3)),
    ("إدريس أبكر", Some(4)),
    ("عبدالله الجهني", None),
    ("بندر بليلة", None),
    ("سعود الشريم", None),
];

/// Row ids created by [`seed_directory`], in sample order.
#[derive(Debug, Clone, Default)]
pub struct SeededDirectory {
    pub locations: Vec<i64>,
    pub entries: Vec<i64>,
}

impl SeededDirectory {
    /// Id of the sample entry with this display name.
    pub fn entry(&self, name: &str) -> Option<i64> {
        SAMPLE_ENTRIES
            .iter()
            .position(|(sample, _)| *sample == name)
            .and_then(|idx| self.entries.get(idx).copied())
    }
}

/// Insert the sample locations and entries directly, bypassing
/// invalidation.
pub fn seed_directory(db: &Database) -> Result<SeededDirectory> {
    let mut seeded = SeededDirectory::default();
    for (name, district, area) in SAMPLE_LOCATIONS {
        let location = db.create_location(&LocationDraft {
            name: name.to_string(),
            district: district.to_string(),
            area: area.to_string(),
            map_link: None,
        })?;
        seeded.locations.push(location.id);
    }
    for (name, location) in SAMPLE_ENTRIES {
        let location_id = location.and_then(|idx| seeded.locations.get(idx).copied());
        seeded.entries.push(db.create_entry(name, location_id)?.id);
    }
    Ok(seeded)
}

/// Seeded in-memory application context with default config.
pub fn fixture_context(shared: Option<Arc<dyn SharedTier>>) -> Result<(AppContext, SeededDirectory)> {
    let db = Database::open_in_memory()?;
    let seeded = seed_directory(&db)?;
    let ctx = AppContext::with_parts(Config::default(), db, shared)?;
    Ok((ctx, seeded))
}
