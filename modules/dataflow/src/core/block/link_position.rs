/// Where a new link is placed in the offer order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LinkPosition {
  /// After every existing link.
  #[default]
  Append,
  /// Before every existing link, including earlier prepends.
  Prepend,
}
