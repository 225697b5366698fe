//! Course catalog: static records plus the pure search/filter/sort view.
//!
//! No I/O and no AI involvement. The view never mutates the source list; it
//! produces a fresh ordered sequence for every input combination. Icon,
//! level, and color are closed enums — no string dispatch.

use serde::{Deserialize, Serialize};

/// Difficulty level of a course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CourseLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl CourseLevel {
    /// Arabic display label, as shown on the filter pills and course cards.
    pub fn label(&self) -> &'static str {
        match self {
            CourseLevel::Beginner => "مبتدئ",
            CourseLevel::Intermediate => "متوسط",
            CourseLevel::Advanced => "متقدم",
        }
    }
}

/// Rendering capability tag for a course icon. Closed mapping; consumers
/// match on the variant to pick the glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CourseIcon {
    Code,
    Brain,
    Database,
    Globe,
    Cpu,
    Layout,
}

/// Accent color tag for a course card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorTag {
    Blue,
    Green,
    Purple,
}

/// One course record. Externally supplied, static for the process lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseRecord {
    /// Unique course id.
    pub id: String,
    pub title: String,
    pub description: String,
    pub icon: CourseIcon,
    pub level: CourseLevel,
    /// Duration label, e.g. "25 ساعة معتمدة"; sorting parses the leading integer.
    pub duration: String,
    pub color: ColorTag,
}

/// Level filter applied to the catalog view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LevelFilter {
    #[default]
    All,
    Only(CourseLevel),
}

/// Sort key applied after filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Original catalog order.
    #[default]
    Default,
    /// Ascending alphabetic by title.
    Title,
    /// Descending by the leading integer of the duration label.
    Duration,
}

/// Per-level tallies for the filter pills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LevelCounts {
    pub all: usize,
    pub beginner: usize,
    pub intermediate: usize,
    pub advanced: usize,
}

/// The built-in academy catalog.
pub fn academy_catalog() -> Vec<CourseRecord> {
    vec![
        CourseRecord {
            id: "python-101".to_string(),
            title: "أساسيات بايثون للذكاء الاصطناعي".to_string(),
            description: "تعلم لغة البرمجة الأكثر شهرة في عالم البيانات والذكاء الاصطناعي من الصفر.".to_string(),
            icon: CourseIcon::Code,
            level: CourseLevel::Beginner,
            duration: "25 ساعة معتمدة".to_string(),
            color: ColorTag::Blue,
        },
        CourseRecord {
            id: "generative-ai".to_string(),
            title: "الذكاء الاصطناعي التوليدي (GenAI)".to_string(),
            description: "تعلم كيفية استخدام وتطوير نماذج الذكاء الاصطناعي التوليدية لبناء تطبيقات ذكية ومبتكرة.".to_string(),
            icon: CourseIcon::Cpu,
            level: CourseLevel::Intermediate,
            duration: "30 ساعة معتمدة".to_string(),
            color: ColorTag::Blue,
        },
        CourseRecord {
            id: "nlp-specialization".to_string(),
            title: "معالجة اللغات الطبيعية (NLP)".to_string(),
            description: "تعلم تقنيات فهم وتحليل النصوص واللغات باستخدام النماذج اللغوية الكبيرة.".to_string(),
            icon: CourseIcon::Layout,
            level: CourseLevel::Advanced,
            duration: "45 ساعة معتمدة".to_string(),
            color: ColorTag::Green,
        },
        CourseRecord {
            id: "deep-learning".to_string(),
            title: "مقدمة في التعلم العميق".to_string(),
            description: "فهم الشبكات العصبية وكيفية بناء نماذج قوية باستخدام TensorFlow و PyTorch.".to_string(),
            icon: CourseIcon::Brain,
            level: CourseLevel::Intermediate,
            duration: "40 ساعة معتمدة".to_string(),
            color: ColorTag::Purple,
        },
        CourseRecord {
            id: "web-dev-fullstack".to_string(),
            title: "تطوير الويب الشامل".to_string(),
            description: "بناء تطبيقات ويب حديثة باستخدام React و Node.js مع دمج تقنيات AI.".to_string(),
            icon: CourseIcon::Globe,
            level: CourseLevel::Advanced,
            duration: "60 ساعة معتمدة".to_string(),
            color: ColorTag::Green,
        },
    ]
}

/// Derived catalog view: filter by search text (case-sensitive substring on
/// title or description), then by level (exact match), then sort. Stable
/// sorts, so ties keep the original catalog order.
pub fn catalog_view(
    courses: &[CourseRecord],
    search: &str,
    filter: LevelFilter,
    sort: SortKey,
) -> Vec<CourseRecord> {
    let mut result: Vec<CourseRecord> = courses
        .iter()
        .filter(|c| {
            search.is_empty() || c.title.contains(search) || c.description.contains(search)
        })
        .filter(|c| match filter {
            LevelFilter::All => true,
            LevelFilter::Only(level) => c.level == level,
        })
        .cloned()
        .collect();

    match sort {
        SortKey::Default => {}
        SortKey::Title => result.sort_by(|a, b| a.title.cmp(&b.title)),
        SortKey::Duration => {
            result.sort_by(|a, b| leading_hours(&b.duration).cmp(&leading_hours(&a.duration)))
        }
    }
    result
}

/// Per-level tallies over the full (unfiltered) catalog.
pub fn level_counts(courses: &[CourseRecord]) -> LevelCounts {
    let mut counts = LevelCounts {
        all: courses.len(),
        ..LevelCounts::default()
    };
    for course in courses {
        match course.level {
            CourseLevel::Beginner => counts.beginner += 1,
            CourseLevel::Intermediate => counts.intermediate += 1,
            CourseLevel::Advanced => counts.advanced += 1,
        }
    }
    counts
}

/// Leading integer of a duration label ("25 ساعة معتمدة" → 25); 0 when the
/// label does not start with digits.
fn leading_hours(label: &str) -> u64 {
    let digits: String = label.chars().take_while(char::is_ascii_digit).collect();
    digits.parse().unwrap_or(0)
}
