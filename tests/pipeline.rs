//! End-to-end runs through files on disk: simulate, fit, export, bundle.

use curvefit::app::pipeline::{run_batch, run_fit};
use curvefit::curve::CurveSampler;
use curvefit::data::{SimulationSpec, generate_sample};
use curvefit::domain::{FitConfig, TransformKind};
use curvefit::error::FitError;
use curvefit::fit::parameter_sigmas;
use curvefit::io::{JsonBundleRenderer, Renderer, read_plot_bundle, write_dataset, write_residuals_csv};
use curvefit::models::lookup;

fn simulate(model: &str, params: Vec<f64>, x_min: f64, x_max: f64, points: usize, seed: u64) -> SimulationSpec {
    SimulationSpec {
        model: lookup(model).unwrap(),
        params,
        x_min,
        x_max,
        points,
        sigma_x: 0.01,
        sigma_y: 0.02,
        seed,
    }
}

#[test]
fn simulated_exponential_round_trips_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("decay.txt");
    let data = generate_sample(&simulate("exponential", vec![5.0, 2.5], 0.0, 8.0, 40, 11)).unwrap();
    write_dataset(&input, &data).unwrap();

    let mut cfg = FitConfig::new(&input, "exponential");
    cfg.initial_guess = Some(vec![4.0, 2.0]);
    cfg.curve_points = 200;
    let run = run_fit(&cfg).unwrap();

    let sigmas = parameter_sigmas(&run.fit).unwrap();
    assert!((run.fit.params[0] - 5.0).abs() < 5.0 * sigmas[0].max(0.01), "{:?}", run.fit.params);
    assert!((run.fit.params[1] - 2.5).abs() < 5.0 * sigmas[1].max(0.01), "{:?}", run.fit.params);
    assert!(run.residuals.r_squared().unwrap() > 0.99);
    assert_eq!(run.residuals.residuals.len(), 40);

    let csv_path = dir.path().join("residuals.csv");
    write_residuals_csv(&csv_path, &run.data, &run.residuals).unwrap();
    let text = std::fs::read_to_string(&csv_path).unwrap();
    assert_eq!(text.lines().count(), 41);

    let bundle_path = dir.path().join("plot.json");
    let renderer = JsonBundleRenderer {
        path: bundle_path.clone(),
        transform: cfg.transform,
    };
    renderer
        .render(&run.fit, &run.data, run.curve.as_ref().unwrap(), &run.residuals)
        .unwrap();
    let bundle = read_plot_bundle(&bundle_path).unwrap();
    assert_eq!(bundle.curve.len(), 200);
    assert_eq!(bundle.params, run.fit.params);
}

#[test]
fn pendulum_power_law_through_log_log() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("period.txt");
    let mut text = String::from("L(cm)\tT(s)\tdL\tdT\n");
    for l in [20.0_f64, 35.0, 50.0, 65.0, 80.0, 95.0] {
        let t = 2.006 * (l / 100.0).sqrt();
        text.push_str(&format!("{l}\t{t}\t0.1\t0.005\n"));
    }
    std::fs::write(&input, text).unwrap();

    let mut cfg = FitConfig::new(&input, "linear");
    cfg.transform = TransformKind::LogLog;
    cfg.x_scale = 0.01;
    let run = run_fit(&cfg).unwrap();

    assert!((run.fit.params[0] - 0.5).abs() < 1e-6);
    assert!((run.fit.params[1].exp() - 2.006).abs() < 1e-6);
    assert!(run.residuals.residuals.iter().all(|r| r.abs() < 1e-9));
}

#[test]
fn non_positive_value_under_log_log_fails_with_index() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("bad.txt");
    std::fs::write(&input, "x y sx sy\n1 1 0.1 0.1\n2 -4 0.1 0.1\n3 9 0.1 0.1\n").unwrap();

    let mut cfg = FitConfig::new(&input, "linear");
    cfg.transform = TransformKind::LogLog;
    let err = run_fit(&cfg).unwrap_err();
    assert_eq!(err.exit_code(), 2);
    assert!(err.to_string().contains("point 1"), "{err}");
}

#[test]
fn sampler_stays_inside_the_data_range() {
    let sampler = CurveSampler::new(lookup("quadratic").unwrap(), vec![1.0, 0.0, 0.0], -2.0, 3.0, 100).unwrap();
    let xs: Vec<f64> = sampler.iter().map(|(x, _)| x).collect();
    assert_eq!(xs.len(), 100);
    assert_eq!(xs[0], -2.0);
    assert!(xs.iter().all(|&x| (-2.0..3.0).contains(&x)));
    assert!(matches!(
        CurveSampler::new(lookup("linear").unwrap(), vec![1.0, 0.0], 1.0, 1.0, 10),
        Err(FitError::EmptyRange { .. })
    ));
}

#[test]
fn batch_matches_single_fits() {
    let dir = tempfile::tempdir().unwrap();
    let mut inputs = Vec::new();
    for seed in 0..4 {
        let path = dir.path().join(format!("run{seed}.txt"));
        let data = generate_sample(&simulate("linear", vec![1.5, -0.5], 0.0, 5.0, 15, seed)).unwrap();
        write_dataset(&path, &data).unwrap();
        inputs.push(path);
    }

    let cfg = FitConfig::new("", "linear");
    let first = run_batch(&cfg, &inputs).unwrap();
    let second = run_batch(&cfg, &inputs).unwrap();

    for ((label, a), (_, b)) in first.iter().zip(&second) {
        let a = a.as_ref().unwrap();
        assert_eq!(a.params, b.as_ref().unwrap().params, "{label}");
    }
    for (path, (_, row)) in inputs.iter().zip(&first) {
        let single = run_fit(&FitConfig::new(path, "linear")).unwrap();
        assert_eq!(row.as_ref().unwrap().params, single.fit.params);
    }
}
