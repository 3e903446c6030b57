/// Commands the presentation layer may send to the running engine.
///
/// The presentation never changes progress state; cancelling the run is the
/// only thing it can ask for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// The user asked to quit; stop dispatching and exit
    Quit,
}
