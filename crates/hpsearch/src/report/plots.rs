use plotly::common::{ErrorData, ErrorType, Mode};
use plotly::layout::{Axis, Layout};
use plotly::{Plot, Scatter};

use crate::search::CvResults;

/// Plot the mean test score of every candidate with a ±std error bar, in
/// evaluation order. Train scores are added as a second trace when recorded.
pub fn plot_candidate_scores(results: &CvResults, title: &str) -> Result<Plot, String> {
    if results.is_empty() {
        return Err("No candidates to plot".to_string());
    }

    let x: Vec<usize> = (1..=results.len()).collect();
    let labels: Vec<String> = results
        .iter()
        .map(|c| crate::params::format_params(&c.params))
        .collect();

    let test = Scatter::new(x.clone(), results.mean_test_scores())
        .mode(Mode::Markers)
        .name("Mean test score")
        .text_array(labels.clone())
        .error_y(
            ErrorData::new(ErrorType::Data)
                .array(results.iter().map(|c| c.std_test_score).collect()),
        );

    let mut plot = Plot::new();
    plot.add_trace(test);

    let train: Option<Vec<f64>> = results.iter().map(|c| c.mean_train_score).collect();
    if let Some(train) = train {
        let trace = Scatter::new(x, train)
            .mode(Mode::Markers)
            .name("Mean train score")
            .text_array(labels);
        plot.add_trace(trace);
    }

    let layout = Layout::new()
        .title(title)
        .x_axis(Axis::new().title("Candidate"))
        .y_axis(Axis::new().title(results.scoring.as_str()));
    plot.set_layout(layout);

    Ok(plot)
}

/// Plot mean test score against one numeric hyper-parameter.
///
/// Candidates without the parameter, or with a non-numeric value, are
/// skipped; an error is returned if none remain.
pub fn plot_score_vs_param(results: &CvResults, param: &str, title: &str) -> Result<Plot, String> {
    let (values, scores): (Vec<f64>, Vec<f64>) = results
        .iter()
        .filter_map(|c| {
            c.params
                .get(param)
                .and_then(|v| v.as_f64())
                .map(|v| (v, c.mean_test_score))
        })
        .unzip();

    if values.is_empty() {
        return Err(format!("No numeric values recorded for parameter '{}'", param));
    }

    let trace = Scatter::new(values, scores)
        .mode(Mode::Markers)
        .name(param);

    let mut plot = Plot::new();
    plot.add_trace(trace);
    plot.set_layout(
        Layout::new()
            .title(title)
            .x_axis(Axis::new().title(param))
            .y_axis(Axis::new().title(results.scoring.as_str())),
    );

    Ok(plot)
}
