// Board-specific drivers; portable ones live in buzz-kernel
pub mod axs15231b;
