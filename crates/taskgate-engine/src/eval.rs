//! Output quality scoring.
//!
//! Scores handler output on three dimensions and averages them into a
//! 0.0..=1.0 quality figure recorded with each dispatch outcome:
//! structural completeness, content richness, and task relevance.

/// Scores handler output against the request it answered.
#[derive(Debug, Clone, Copy)]
pub struct QualityScorer {
    pass_score: f32,
}

impl Default for QualityScorer {
    fn default() -> Self {
        Self { pass_score: 0.7 }
    }
}

impl QualityScorer {
    pub fn new(pass_score: f32) -> Self {
        Self { pass_score }
    }

    /// Composite quality score for an output, 0.0..=1.0.
    pub fn score(&self, task_text: &str, output: &str) -> f32 {
        let dims = [
            Self::structure(output),
            Self::richness(output),
            Self::relevance(task_text, output),
        ];
        dims.iter().sum::<f32>() / dims.len() as f32
    }

    pub fn is_passing(&self, score: f32) -> bool {
        score >= self.pass_score
    }

    /// Structural completeness: headings, lists, multiple lines, key-value
    /// pairs each add to a 0.3 base.
    fn structure(output: &str) -> f32 {
        let mut score: f32 = 0.3;
        if output.contains('#') {
            score += 0.2;
        }
        if output.contains('-') || output.contains('*') {
            score += 0.2;
        }
        if output.lines().count() >= 3 {
            score += 0.15;
        }
        if output.contains(':') {
            score += 0.15;
        }
        score.min(1.0)
    }

    /// Content richness by character count bands.
    fn richness(output: &str) -> f32 {
        match output.chars().count() {
            n if n >= 500 => 1.0,
            n if n >= 200 => 0.8,
            n if n >= 100 => 0.6,
            n if n >= 50 => 0.4,
            _ => 0.2,
        }
    }

    /// Fraction of request words that reappear in the output.
    fn relevance(task_text: &str, output: &str) -> f32 {
        let output_lower = output.to_lowercase();
        let task_lower = task_text.to_lowercase().replace(['\'', '"'], "");
        let words: Vec<&str> = task_lower.split_whitespace().collect();
        if words.is_empty() {
            return 0.5;
        }
        let matches = words.iter().filter(|w| output_lower.contains(**w)).count();
        (matches as f32 / words.len() as f32).min(1.0)
    }
}
