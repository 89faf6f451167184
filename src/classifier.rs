use crate::error::ClassificationError;
use crate::guess::RankedGuess;
use crate::sample::Sample;

/// Ranks a sample against the known labels.
///
/// Implementations may take a long time; the scheduler only ever calls
/// `classify` from its worker thread, one sample at a time per session.
/// The returned ranking must be sorted descending, which `RankedGuess::new`
/// guarantees.
pub trait Classifier: Send + Sync + 'static {
    fn classify(&self, sample: &Sample) -> Result<RankedGuess, ClassificationError>;
}

impl<F> Classifier for F
where
    F: Fn(&Sample) -> Result<RankedGuess, ClassificationError> + Send + Sync + 'static,
{
    fn classify(&self, sample: &Sample) -> Result<RankedGuess, ClassificationError> {
        self(sample)
    }
}
