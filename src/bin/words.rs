//! Word-list throughput comparison between `ArrayHash` and general purpose
//! maps.
//!
//! Reads whitespace separated words from a file, then for a growing number of
//! words reports the best time out of several repetitions to insert every
//! word, query every word in order, and query every word in shuffled order.

use arrayhash::{ArrayHash, ByteHasher, CrapWow, FxHash, SuperFast};

use std::{
    collections::BTreeMap,
    fs, io,
    path::PathBuf,
    process::ExitCode,
    time::{Duration, Instant},
};

use clap::{Parser, ValueEnum};
use fxhash::FxBuildHasher;
use rand::seq::SliceRandom;
use tracing_subscriber::EnvFilter;

const COUNTS: &[usize] = &[
    10, 20, 30, 40, 50, 60, 70, 80, 90, 100, 150, 200, 250, 300, 350, 400, 450, 500, 550, 600,
    650, 700, 750, 800, 850, 900, 950, 1000, 1500, 2000, 2500, 3000, 3500, 4000, 4500, 5000, 5500,
    6000, 6500, 7000, 7500, 8000, 8500, 9000, 9500, 10000, 15000, 20000, 25000, 30000, 35000,
    40000, 45000, 50000, 55000, 60000, 65000, 70000, 75000, 80000, 85000, 90000, 95000,
];

#[derive(Parser, Debug)]
#[command(
    name = "arrayhash-words",
    about = "Compare ArrayHash against BTreeMap and hashbrown on a word list"
)]
struct Args {
    /// File of whitespace separated words
    words: PathBuf,

    /// Maximum number of words to read
    #[arg(long, default_value_t = 100_000)]
    limit: usize,

    /// Repetitions per measurement; the fastest is reported
    #[arg(long, default_value_t = 10)]
    repetitions: usize,

    /// Number of ArrayHash bins
    #[arg(long, default_value_t = arrayhash::DEFAULT_BIN_COUNT)]
    bins: usize,

    /// Hash function used by ArrayHash
    #[arg(long, value_enum, default_value_t = HashFunction::SuperFast)]
    hasher: HashFunction,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum HashFunction {
    SuperFast,
    CrapWow,
    Fx,
}

#[derive(Debug, thiserror::Error)]
enum DriverError {
    #[error("could not read word list: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Table(#[from] arrayhash::Error),
    #[error("{map} lost the word {word:?}")]
    Missing { map: &'static str, word: String },
}

trait WordMap {
    const NAME: &'static str;

    fn assign(&mut self, word: &str, value: usize) -> Result<(), DriverError>;

    fn lookup(&self, word: &str) -> Option<usize>;
}

impl<H: ByteHasher> WordMap for ArrayHash<usize, H> {
    const NAME: &'static str = "ArrayHash";

    fn assign(&mut self, word: &str, value: usize) -> Result<(), DriverError> {
        *self.get_or_insert(word)? = value;

        Ok(())
    }

    fn lookup(&self, word: &str) -> Option<usize> {
        self.get(word).copied()
    }
}

impl WordMap for BTreeMap<String, usize> {
    const NAME: &'static str = "BTreeMap";

    fn assign(&mut self, word: &str, value: usize) -> Result<(), DriverError> {
        *self.entry(word.to_owned()).or_default() = value;

        Ok(())
    }

    fn lookup(&self, word: &str) -> Option<usize> {
        self.get(word).copied()
    }
}

impl WordMap for hashbrown::HashMap<String, usize, FxBuildHasher> {
    const NAME: &'static str = "hashbrown";

    fn assign(&mut self, word: &str, value: usize) -> Result<(), DriverError> {
        *self.entry_ref(word).or_default() = value;

        Ok(())
    }

    fn lookup(&self, word: &str) -> Option<usize> {
        self.get(word).copied()
    }
}

fn best_of<F: FnMut() -> Result<(), DriverError>>(
    repetitions: usize,
    mut func: F,
) -> Result<Duration, DriverError> {
    let mut best = Duration::MAX;

    for _ in 0..repetitions.max(1) {
        let start = Instant::now();
        func()?;
        best = best.min(start.elapsed());
    }

    Ok(best)
}

/// Insertion, in-order query and shuffled query times for one map.
fn measure<M: WordMap>(
    map: &mut M,
    words: &[&str],
    shuffled: &[&str],
    repetitions: usize,
) -> Result<[Duration; 3], DriverError> {
    let insertion = best_of(repetitions, || {
        for word in words {
            map.assign(word, 1)?;
        }

        Ok(())
    })?;

    let query = |order: &[&str]| {
        best_of(repetitions, || {
            for word in order {
                if map.lookup(word) != Some(1) {
                    return Err(DriverError::Missing {
                        map: M::NAME,
                        word: word.to_string(),
                    });
                }
            }

            Ok(())
        })
    };

    Ok([insertion, query(words)?, query(shuffled)?])
}

fn run<H: ByteHasher + Copy>(args: &Args, hasher: H) -> Result<(), DriverError> {
    tracing::info!(path = %args.words.display(), "reading word list");

    let text = fs::read_to_string(&args.words)?;
    let words: Vec<&str> = text.split_whitespace().take(args.limit).collect();

    tracing::info!(words = words.len(), bins = args.bins, hasher = ?args.hasher, "done reading");

    println!("       |          ArrayHash          |          BTreeMap           |          hashbrown          |");
    println!(" Count | Insert  |  Query  | Random  | Insert  |  Query  | Random  | Insert  |  Query  | Random  |");

    let mut rng = rand::thread_rng();

    for &count in COUNTS.iter().take_while(|&&count| count <= words.len()) {
        let words = &words[..count];
        let mut shuffled = words.to_vec();
        shuffled.shuffle(&mut rng);

        let mut array_hash = ArrayHash::<usize, H>::with_bins_and_hasher(args.bins, hasher)?;
        let mut btree: BTreeMap<String, usize> = BTreeMap::new();
        let mut hashbrown: hashbrown::HashMap<String, usize, _> =
            hashbrown::HashMap::with_hasher(FxBuildHasher::default());

        let timings = [
            measure(&mut array_hash, words, &shuffled, args.repetitions)?,
            measure(&mut btree, words, &shuffled, args.repetitions)?,
            measure(&mut hashbrown, words, &shuffled, args.repetitions)?,
        ];

        print!("{:6}", count);
        for duration in timings.iter().flatten() {
            print!("   {:7}", duration.as_micros());
        }
        println!();

        tracing::debug!(count, bin_bytes = array_hash.bin_bytes(), "array hash footprint");
    }

    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let result = match args.hasher {
        HashFunction::SuperFast => run(&args, SuperFast),
        HashFunction::CrapWow => run(&args, CrapWow::new()),
        HashFunction::Fx => run(&args, FxHash),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "benchmark failed");
            ExitCode::FAILURE
        }
    }
}
