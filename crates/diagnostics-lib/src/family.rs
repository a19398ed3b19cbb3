//! Task family extraction seam
//!
//! Grouping a task key into a display family is a naming convention owned
//! by the scheduler, so it is injected rather than hard-coded here.

/// Maps a task key to the family it is displayed under
pub trait KeyFamily {
    fn family(&self, key: &str) -> String;
}

impl<F> KeyFamily for F
where
    F: Fn(&str) -> String,
{
    fn family(&self, key: &str) -> String {
        self(key)
    }
}
