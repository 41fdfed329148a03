use std::path::Path;

use anyhow::{Context, Result};
use student_insights::data::loader::load_file;
use student_insights::{Analyzer, FilterCriteria, Schema};

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    /// Integer drawn from a clamped normal.
    fn int(&mut self, mean: f64, std_dev: f64, lo: f64, hi: f64) -> i64 {
        self.gauss(mean, std_dev).round().clamp(lo, hi) as i64
    }

    /// Pick from `options` with the given relative weights.
    fn pick<'a>(&mut self, options: &[(&'a str, f64)]) -> &'a str {
        let total: f64 = options.iter().map(|(_, w)| w).sum();
        let mut roll = self.next_f64() * total;
        for &(label, weight) in options {
            if roll < weight {
                return label;
            }
            roll -= weight;
        }
        options[options.len() - 1].0
    }
}

const HEADERS: [&str; 20] = [
    "Hours_Studied",
    "Attendance",
    "Parental_Involvement",
    "Access_to_Resources",
    "Extracurricular_Activities",
    "Sleep_Hours",
    "Previous_Scores",
    "Motivation_Level",
    "Internet_Access",
    "Tutoring_Sessions",
    "Family_Income",
    "Teacher_Quality",
    "School_Type",
    "Peer_Influence",
    "Physical_Activity",
    "Learning_Disabilities",
    "Parental_Education_Level",
    "Distance_From_Home",
    "Gender",
    "Exam_Score",
];

fn level_bonus(level: &str) -> f64 {
    match level {
        "High" | "Positive" => 1.0,
        "Low" | "Negative" => -1.0,
        _ => 0.0,
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let mut rng = SimpleRng::new(42);
    let lmh = [("Low", 0.3), ("Medium", 0.5), ("High", 0.2)];

    let output_path = "StudentPerformanceFactors.csv";
    let mut writer = csv::Writer::from_path(output_path)
        .with_context(|| format!("creating {output_path}"))?;
    writer.write_record(HEADERS).context("writing header")?;

    let n_students = 2000;
    for _ in 0..n_students {
        let hours = rng.int(20.0, 6.0, 1.0, 44.0);
        let attendance = rng.int(80.0, 11.0, 60.0, 100.0);
        let parental = rng.pick(&lmh);
        let resources = rng.pick(&lmh);
        let extracurricular = rng.pick(&[("Yes", 0.6), ("No", 0.4)]);
        let sleep = rng.int(7.0, 1.5, 4.0, 10.0);
        let previous = rng.int(75.0, 14.0, 50.0, 100.0);
        let motivation = rng.pick(&lmh);
        let internet = rng.pick(&[("Yes", 0.92), ("No", 0.08)]);
        let tutoring = rng.int(1.5, 1.2, 0.0, 8.0);
        let income = rng.pick(&lmh);
        let teacher_quality = rng.pick(&[("Low", 0.1), ("Medium", 0.6), ("High", 0.3)]);
        let school = rng.pick(&[("Public", 0.7), ("Private", 0.3)]);
        let peer = rng.pick(&[("Negative", 0.2), ("Neutral", 0.4), ("Positive", 0.4)]);
        let activity = rng.int(3.0, 1.0, 0.0, 6.0);
        let disability = rng.pick(&[("No", 0.9), ("Yes", 0.1)]);
        let education = rng.pick(&[("High School", 0.5), ("College", 0.3), ("Postgraduate", 0.2)]);
        // A handful of rows with the distance missing, as in the real export.
        let distance = rng.pick(&[("Near", 0.58), ("Moderate", 0.3), ("Far", 0.1), ("", 0.02)]);
        let gender = rng.pick(&[("Male", 0.58), ("Female", 0.42)]);

        let penalty = if disability == "Yes" { 0.9 } else { 0.0 };
        let score = 40.0
            + 0.29 * hours as f64
            + 0.2 * attendance as f64
            + 0.05 * previous as f64
            + 0.5 * tutoring as f64
            + 1.0 * level_bonus(parental)
            + 1.0 * level_bonus(resources)
            + 0.5 * level_bonus(peer)
            - penalty
            + rng.gauss(0.0, 2.0);
        let score = score.round().clamp(55.0, 101.0) as i64;

        let row = [
            hours.to_string(),
            attendance.to_string(),
            parental.to_string(),
            resources.to_string(),
            extracurricular.to_string(),
            sleep.to_string(),
            previous.to_string(),
            motivation.to_string(),
            internet.to_string(),
            tutoring.to_string(),
            income.to_string(),
            teacher_quality.to_string(),
            school.to_string(),
            peer.to_string(),
            activity.to_string(),
            disability.to_string(),
            education.to_string(),
            distance.to_string(),
            gender.to_string(),
            score.to_string(),
        ];
        writer.write_record(&row).context("writing student row")?;
    }
    writer.flush().context("flushing CSV")?;
    log::info!("Wrote {n_students} students to {output_path}");

    // Read it back through the engine as a smoke check.
    let schema = Schema::default();
    let dataset = load_file(Path::new(output_path), &schema)?;
    let analyzer = Analyzer::new(schema);
    let visible = analyzer.filter(&dataset.records, &FilterCriteria::default());
    let summary = analyzer.summary(&visible);
    log::info!(
        "{} students visible, mean score {:.1}",
        summary.total,
        summary.average.unwrap_or_default()
    );
    for c in analyzer.correlations(&visible).iter().take(3) {
        log::info!("  {:<20} r = {:+.3}", c.factor, c.coefficient);
    }

    println!("Wrote {n_students} students to {output_path}");
    Ok(())
}
