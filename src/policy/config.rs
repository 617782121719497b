/// Policy governs durability and batch behaviour of the provisioner.
///
/// Grouped fields provide clearer ownership and ergonomics.
#[derive(Clone, Debug, Default)]
pub struct Policy {
    pub durability: Durability,
    pub apply: ApplyFlow,
}

#[derive(Clone, Copy, Debug)]
pub struct Durability {
    /// Fsync each staging file before it is published.
    pub fsync_file: bool,
    /// Fsync the parent directory after publishing.
    pub fsync_parent: bool,
}

impl Default for Durability {
    fn default() -> Self {
        Self {
            fsync_file: true,
            fsync_parent: true,
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ApplyFlow {
    /// Keep materializing the remaining files of a batch after a failure.
    /// By default the first failure stops the batch.
    pub continue_on_error: bool,
}

impl Policy {
    /// Policy for scratch trees (tests, image builds into a throwaway directory):
    /// no fsyncs.
    #[must_use]
    pub fn ephemeral() -> Self {
        let mut p = Self::default();
        p.durability.fsync_file = false;
        p.durability.fsync_parent = false;
        p
    }
}
