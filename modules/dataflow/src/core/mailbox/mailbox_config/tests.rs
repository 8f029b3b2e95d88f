use core::num::NonZeroUsize;

use super::MailboxConfig;

#[test]
fn unbounded_config_always_has_room() {
  let config = MailboxConfig::new();
  assert!(config.has_room(usize::MAX - 1));
  assert_eq!(config.task_budget(), usize::MAX);
}

#[test]
fn bounded_config_checks_item_count() {
  let config = MailboxConfig::new()
    .with_bounded_capacity(NonZeroUsize::new(2).unwrap())
    .with_max_messages_per_task(NonZeroUsize::new(5).unwrap());
  assert!(config.has_room(1));
  assert!(!config.has_room(2));
  assert_eq!(config.task_budget(), 5);
}
