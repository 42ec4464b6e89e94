use std::{sync::Arc, time::Duration};

use session_subtyping::{
    generate::exponential_counterexample, runtimes::tokio::run_with_deadline, Algorithm,
};

const DEADLINE: Duration = Duration::from_millis(250);

#[tokio::main]
async fn main() {
    println!("subtype(T_k, T_k+1), {DEADLINE:?} per check\n");
    for k in 1..=12 {
        let left = Arc::new(exponential_counterexample(k));
        let right = Arc::new(exponential_counterexample(k + 1));

        let mut line = format!("k = {k:>2}:");
        for algorithm in Algorithm::ALL {
            let (left, right) = (Arc::clone(&left), Arc::clone(&right));
            let run = run_with_deadline(DEADLINE, move |cancel| {
                algorithm.subtype_counted(&left, &right, cancel)
            })
            .await;

            let (holds, steps) = run.value;
            let outcome = if run.completed {
                format!("{holds} after {steps} steps")
            } else {
                format!("gave up after {steps} steps")
            };
            line += &format!("  {algorithm:>11}: {outcome:<30} ({:?})", run.elapsed);
        }
        println!("{line}");
    }
}
