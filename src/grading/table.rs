//! Grade tables, correction symbols and score formatting.

use crate::foundation::core::CssColor;

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// Lowest percentage that still earns `grade`.
pub struct GradeRow {
    /// Threshold in percent of the maximum points.
    pub min_percent: f64,
    /// Grade label, e.g. `"2"` or `"11"`.
    #[serde(deserialize_with = "string_or_number")]
    pub grade: String,
}

impl GradeRow {
    pub fn new(min_percent: f64, grade: impl Into<String>) -> Self {
        Self {
            min_percent,
            grade: grade.into(),
        }
    }
}

/// Percentage thresholds ordered from best to worst grade.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(from = "Vec<GradeRow>", into = "Vec<GradeRow>")]
pub struct GradeTable {
    rows: Vec<GradeRow>,
}

impl From<Vec<GradeRow>> for GradeTable {
    fn from(rows: Vec<GradeRow>) -> Self {
        Self::new(rows)
    }
}

impl From<GradeTable> for Vec<GradeRow> {
    fn from(t: GradeTable) -> Self {
        t.rows
    }
}

impl Default for GradeTable {
    fn default() -> Self {
        Self::sek_i()
    }
}

impl GradeTable {
    pub fn new(mut rows: Vec<GradeRow>) -> Self {
        rows.sort_by(|a, b| b.min_percent.total_cmp(&a.min_percent));
        Self { rows }
    }

    /// Grades 1 (best) to 6.
    pub fn sek_i() -> Self {
        Self::new(
            [(92.0, "1"), (81.0, "2"), (67.0, "3"), (50.0, "4"), (25.0, "5"), (0.0, "6")]
                .into_iter()
                .map(|(p, g)| GradeRow::new(p, g))
                .collect(),
        )
    }

    /// Points 15 (best) to 00.
    pub fn sek_ii() -> Self {
        let grades = [
            (95.0, "15"),
            (90.0, "14"),
            (85.0, "13"),
            (80.0, "12"),
            (75.0, "11"),
            (70.0, "10"),
            (65.0, "09"),
            (60.0, "08"),
            (55.0, "07"),
            (50.0, "06"),
            (45.0, "05"),
            (40.0, "04"),
            (33.0, "03"),
            (27.0, "02"),
            (20.0, "01"),
            (0.0, "00"),
        ];
        Self::new(grades.into_iter().map(|(p, g)| GradeRow::new(p, g)).collect())
    }

    pub fn rows(&self) -> &[GradeRow] {
        &self.rows
    }

    /// Raw grade label for `points` out of `max_points`; `"-"` when nothing can be computed.
    pub fn grade_for(&self, points: f64, max_points: f64) -> String {
        if self.rows.is_empty() || max_points == 0.0 || !max_points.is_finite() {
            return "-".to_owned();
        }
        let percent = points / max_points * 100.0;
        self.rows
            .iter()
            .find(|row| percent >= row.min_percent)
            .or_else(|| self.rows.last())
            .map_or_else(|| "-".to_owned(), |row| row.grade.clone())
    }

    /// Tables whose best numeric grade exceeds 6 use the 0..15 points scale.
    pub fn is_points_scale(&self) -> bool {
        self.rows
            .iter()
            .filter_map(|r| r.grade.trim().replace(',', ".").parse::<f64>().ok())
            .filter(|n| n.is_finite())
            .fold(None, |acc: Option<f64>, n| Some(acc.map_or(n, |m| m.max(n))))
            .is_some_and(|max| max > 6.0)
    }

    /// Display form of a grade label: points-scale grades read `"07 P."`, zero reads `"00"`.
    pub fn format_grade(&self, grade: &str) -> String {
        let g = grade.trim();
        if g.is_empty() || g == "-" {
            return "-".to_owned();
        }
        if !self.is_points_scale() {
            return g.to_owned();
        }
        match leading_int(g) {
            Some(n @ 1..=15) => format!("{n:02} P."),
            Some(0) => "00".to_owned(),
            _ => g.to_owned(),
        }
    }

    /// Formatted grade for `points` out of `max_points`.
    pub fn display_grade(&self, points: f64, max_points: f64) -> String {
        self.format_grade(&self.grade_for(points, max_points))
    }
}

fn leading_int(s: &str) -> Option<i64> {
    let digits: String = s
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

/// Points rounded to half steps: `8`, `8.5`; `"—"` for non-finite input.
pub fn format_points(v: f64) -> String {
    if !v.is_finite() {
        return "—".to_owned();
    }
    let rounded = (v * 2.0).round() / 2.0;
    if rounded.fract() == 0.0 {
        format!("{}", rounded as i64)
    } else {
        format!("{rounded}")
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// A correction symbol offered by the mark tool.
pub struct CorrectionMark {
    /// Glyph text.
    pub symbol: String,
    /// Long name.
    #[serde(default)]
    pub name: String,
    /// Glyph color.
    pub color: CssColor,
}

pub fn default_correction_marks() -> Vec<CorrectionMark> {
    [
        ("Gr", "Grammatik", "#ef4444"),
        ("O", "Orthographie", "#f97316"),
        ("V", "Vokabular", "#eab308"),
        ("Conj", "Konjugation", "#22c55e"),
        ("Acc", "Akzent", "#3b82f6"),
        ("G", "Genus", "#8b5cf6"),
    ]
    .into_iter()
    .filter_map(|(symbol, name, color)| {
        CssColor::parse(color).ok().map(|color| CorrectionMark {
            symbol: symbol.to_owned(),
            name: name.to_owned(),
            color,
        })
    })
    .collect()
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(serde::Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Str(String),
        Num(serde_json::Number),
    }

    Ok(match <Repr as serde::Deserialize>::deserialize(deserializer)? {
        Repr::Str(s) => s,
        Repr::Num(n) => n.to_string(),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/grading/table.rs"]
mod tests;
