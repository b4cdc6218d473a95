//! Ranking reports

use super::container::ModelPopulation;
use crate::error::{Result, SearchError};
use std::fmt::Write as _;
use std::path::Path;

/// Error metric a ranking is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankMetric {
    Ein,
    Ecv,
}

impl RankMetric {
    pub fn label(&self) -> &'static str {
        match self {
            RankMetric::Ein => "Ein",
            RankMetric::Ecv => "Ecv",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            RankMetric::Ein => "model ranking in sample error",
            RankMetric::Ecv => "model ranking in cross validation error",
        }
    }

    /// Default report file name.
    pub fn file_name(&self) -> &'static str {
        match self {
            RankMetric::Ein => "ranking_ein.txt",
            RankMetric::Ecv => "ranking_ecv.txt",
        }
    }
}

/// Sort `population` by `metric` and render the report.
pub fn render_ranking(population: &mut ModelPopulation, metric: RankMetric) -> String {
    match metric {
        RankMetric::Ein => population.sort_by_ein(),
        RankMetric::Ecv => population.sort_by_ecv(),
    }

    let mut out = String::new();
    out.push_str(metric.title());
    out.push('\n');
    for (rank, model) in population.iter().enumerate() {
        let error = match metric {
            RankMetric::Ein => model.ein(),
            RankMetric::Ecv => model.ecv(),
        };
        let _ = writeln!(
            out,
            "{}\t\t{} = {:.6}\tmodel: {}",
            rank,
            metric.label(),
            error,
            model.name()
        );
    }
    out
}

/// Sort `population` by `metric` and write the report to `path`.
pub fn write_ranking(population: &mut ModelPopulation, path: &Path, metric: RankMetric) -> Result<()> {
    let report = render_ranking(population, metric);
    std::fs::write(path, report)
        .map_err(|e| SearchError::ExportError(format!("{}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DataMatrix;
    use crate::learners::{LearnerConfig, ModelKind};
    use crate::search::recipe::ModelRecipe;
    use crate::search::trainer::ModelTrainer;

    fn population() -> ModelPopulation {
        let rows = vec![
            vec![-2.0, 1.0, 0.0],
            vec![-1.0, -1.0, 0.0],
            vec![1.0, 1.0, 1.0],
            vec![2.0, -1.0, 1.0],
            vec![-3.0, 1.0, 1.0],
        ];
        let data = DataMatrix::from_rows(&rows, Some(2), vec![0, 1]).unwrap();
        let trainer = ModelTrainer::new(LearnerConfig {
            cv_folds: 5,
            ..Default::default()
        });
        [vec![1], vec![0], vec![0, 1]]
            .into_iter()
            .map(|f| trainer.train(&ModelRecipe::new(ModelKind::Linreg, f), &data).unwrap())
            .collect()
    }

    #[test]
    fn test_ein_ranking_format() {
        let mut population = population();
        let report = render_ranking(&mut population, RankMetric::Ein);
        let lines: Vec<&str> = report.lines().collect();

        assert_eq!(lines[0], "model ranking in sample error");
        assert_eq!(lines.len(), 4);
        for (i, line) in lines[1..].iter().enumerate() {
            assert!(line.starts_with(&format!("{}\t\tEin = ", i)), "{}", line);
            assert!(line.contains("\tmodel: linreg ["), "{}", line);
        }

        let errors: Vec<f64> = lines[1..]
            .iter()
            .map(|l| l.split("Ein = ").nth(1).unwrap()[..8].parse().unwrap())
            .collect();
        assert!(errors.windows(2).all(|w| w[0] <= w[1]), "{:?}", errors);
    }

    #[test]
    fn test_write_ecv_ranking() {
        let mut population = population();
        let path = std::env::temp_dir().join(format!("titanic_ranking_{}.txt", std::process::id()));
        write_ranking(&mut population, &path, RankMetric::Ecv).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("model ranking in cross validation error\n"));
        assert!(content.contains("0\t\tEcv = "));
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_empty_population() {
        let mut population = ModelPopulation::new();
        assert_eq!(render_ranking(&mut population, RankMetric::Ein), "model ranking in sample error\n");
    }
}
