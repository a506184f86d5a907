use quarry::criteria::{field, CriteriaDocument};
use quarry::errors::QuarryResult;
use quarry::{criteria, options};

fn main() -> QuarryResult<()> {
    println!("Starting merge stress run...");

    let count = 1_000;
    let start = std::time::Instant::now();

    let mut combined = CriteriaDocument::new();
    for i in 0..count {
        let mut step = criteria! { category: "stress" };
        step.set(field("sequence").gt(), i);
        combined.merge_in_place(&step)?;
    }

    let options = options! { order: "sequence desc", limit: 100 };
    println!(
        "Merged {} documents in {:?}: {} keys, options {}",
        count,
        start.elapsed(),
        combined.len(),
        options
    );
    Ok(())
}
