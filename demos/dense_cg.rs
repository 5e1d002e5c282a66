use conjgrad::core::traits::{FnOperator, Vector};
use conjgrad::solver::conjgrad_with_info;
use conjgrad::utils::convergence::TerminationStatus;
use conjgrad::CgOptions;
use faer::Mat;
use rand::Rng;

fn main() -> Result<(), conjgrad::CgError> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    // flags such as `-cg_tol 1e-12 -cg_verbose 2`
    let opts = CgOptions::from_args(std::env::args().skip(1))?;

    println!("status codes:");
    for code in 0u8.. {
        let Some(status) = TerminationStatus::from_code(code) else { break };
        println!("  {code}: {status}");
    }

    let n = 10;
    // build a random SPD matrix: A = MᵀM + I
    let mut rng = rand::thread_rng();
    let data: Vec<f64> = (0..n * n).map(|_| rng.r#gen()).collect();
    let a = Mat::from_fn(n, n, |i, j| {
        let mtm: f64 = (0..n).map(|k| data[k * n + i] * data[k * n + j]).sum();
        if i == j { mtm + 1.0 } else { mtm }
    });

    // rhs
    let b: Vec<f64> = (0..n).map(|_| rng.r#gen()).collect();

    let sol = conjgrad_with_info(&a, &b, &opts)?;
    println!("dense: x = {:?}", sol.x);
    println!(
        "dense: [{}] {} after {} iterations, |r| = {:e}",
        sol.status().code(),
        sol.status(),
        sol.iterations(),
        sol.stats.final_residual
    );

    // an indefinite operator breaks down immediately
    let neg = FnOperator(|x: &Vec<f64>, y: &mut Vec<f64>| {
        y.copy_from(x);
        y.scale(-1.0);
    });
    let sol = conjgrad_with_info(&neg, &b, &opts)?;
    println!("indefinite: [{}] {} after {} iterations", sol.status().code(), sol.status(), sol.iterations());
    Ok(())
}
