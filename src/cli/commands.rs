// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the two subcommands: `inspect` and `vocab`
// and all their configurable flags.
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};
use crate::application::config::DatasetConfig;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the train/eval loaders and report what the packer produces
    Inspect(InspectArgs),

    /// Show a dictionary's special ids, or encode/decode with it
    Vocab(VocabArgs),
}

/// All arguments for the `inspect` command.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Read the dataset config from this JSON file instead of the flags below
    #[arg(long)]
    pub config: Option<String>,

    /// Write the effective config to this JSON file
    #[arg(long)]
    pub save_config: Option<String>,

    /// Directory for batch_metrics.csv (not written when omitted)
    #[arg(long)]
    pub metrics_dir: Option<String>,

    /// Number of epochs to walk
    #[arg(long, default_value_t = 1)]
    pub epochs: u64,

    #[arg(long, default_value = "data/train_images.json")]
    pub train_image_path: String,

    #[arg(long, default_value = "data/train_labels.json")]
    pub train_label_path: String,

    #[arg(long, default_value = "data/eval_images.json")]
    pub eval_image_path: String,

    #[arg(long, default_value = "data/eval_labels.json")]
    pub eval_label_path: String,

    /// One symbol per line; the line number is the id
    #[arg(long, default_value = "data/dictionary.txt")]
    pub vocab_path: String,

    /// Width factor of the per-batch pixel budget
    #[arg(long, default_value_t = 1600)]
    pub image_width: usize,

    /// Height factor of the per-batch pixel budget
    #[arg(long, default_value_t = 320)]
    pub image_height: usize,

    #[arg(long, default_value_t = 8)]
    pub batch_size: usize,

    /// Base seed for the per-epoch training shuffle
    #[arg(long, default_value_t = 0)]
    pub seed: u64,

    /// Number of data-parallel replicas
    #[arg(long, default_value_t = 1)]
    pub num_replicas: usize,

    /// This process's replica index
    #[arg(long, default_value_t = 0)]
    pub rank: usize,
}

/// Convert CLI InspectArgs into the application-layer DatasetConfig.
/// The application layer never sees clap types.
impl From<&InspectArgs> for DatasetConfig {
    fn from(a: &InspectArgs) -> Self {
        DatasetConfig {
            train_image_path: a.train_image_path.clone(),
            train_label_path: a.train_label_path.clone(),
            eval_image_path:  a.eval_image_path.clone(),
            eval_label_path:  a.eval_label_path.clone(),
            vocab_path:       a.vocab_path.clone(),
            image_width:      a.image_width,
            image_height:     a.image_height,
            batch_size:       a.batch_size,
            seed:             a.seed,
            num_replicas:     a.num_replicas,
            rank:             a.rank,
        }
    }
}

/// All arguments for the `vocab` command
#[derive(Args, Debug)]
pub struct VocabArgs {
    #[arg(long, default_value = "data/dictionary.txt")]
    pub vocab_path: String,

    /// Whitespace-separated symbols to encode
    #[arg(long)]
    pub encode: Option<String>,

    /// Whitespace-separated ids to decode
    #[arg(long)]
    pub decode: Option<String>,
}
