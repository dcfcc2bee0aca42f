use std::env;
use std::process;

use autoencoder::trainer::{LearningMode, Logging, StopCondition};
use autoencoder::{random, Autoencoder, AutoencoderBuilder, Trainer};
use log::{error, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const SIDE: usize = 4;
const NOISE: f64 = 0.05;

type Pattern = [f64; SIDE * SIDE];

/// Generates 4x4 images holding a single horizontal or vertical bar, with
/// every pixel flipped with probability `NOISE`.
fn generate_data(num_samples: usize, rng: &mut StdRng) -> Vec<Pattern> {
    let mut data = Vec::with_capacity(num_samples);
    for _ in 0..num_samples {
        let bar = rng.gen_range(0..SIDE);
        let vertical = rng.gen_bool(0.5);
        let mut pattern = [0.0; SIDE * SIDE];
        for row in 0..SIDE {
            for col in 0..SIDE {
                let on = if vertical { col == bar } else { row == bar };
                let flipped = rng.gen_bool(NOISE);
                pattern[row * SIDE + col] = if on != flipped { 1.0 } else { 0.0 };
            }
        }
        data.push(pattern);
    }
    data
}

fn score(set_name: &str, model: &mut Autoencoder, data: &[Pattern]) -> autoencoder::Result<()> {
    let mut total = 0.0;
    for pattern in data {
        let code = model.compress(pattern)?;
        let reconstruction = model.reconstruct(&code)?;
        total += pattern
            .iter()
            .zip(&reconstruction)
            .map(|(a, b)| (a - b) * (a - b))
            .sum::<f64>()
            / pattern.len() as f64;
    }
    println!(
        "{} set: mean reconstruction error {:.4} over {} patterns",
        set_name,
        total / data.len() as f64,
        data.len()
    );
    Ok(())
}

fn run() -> autoencoder::Result<()> {
    let mut rng = StdRng::seed_from_u64(2007);
    let training_data = generate_data(500, &mut rng);

    let model = AutoencoderBuilder::new()
        .binary_layer(SIDE * SIDE)
        .binary_layer(8)
        .binary_layer(4)
        .pretraining_weight_rate(0, 0.05)
        .pretraining_weight_rate(1, 0.05)
        .pretraining_bias_rate(0, 0.05)
        .pretraining_bias_rate(1, 0.05)
        .finetuning_weight_rate(0, 0.01)
        .finetuning_weight_rate(1, 0.01)
        .random_source(random::seeded(rng.gen()))
        .build()?;

    let mut model = Trainer::new(model)
        .learning_mode(LearningMode::Batch(10))
        .pretraining_stop(StopCondition::Iterations(50))
        .finetuning_stop(StopCondition::Iterations(20))
        .logging(Logging::Iterations(10))
        .train(&training_data)?;

    println!();
    score("Training", &mut model, &training_data)?;
    score("Test", &mut model, &generate_data(100, &mut rng))?;

    if let Some(path) = env::args().nth(1) {
        model.save_file(&path)?;
        info!("saved model to {}", path);
    }
    Ok(())
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        error!("training failed: {}", e);
        eprintln!("error: {}", e);
        process::exit(1);
    }
}
