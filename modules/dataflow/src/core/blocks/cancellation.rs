use alloc::sync::Arc;

use crate::core::{block::BlockOptions, mailbox::Mailbox};

/// Cancels `mailbox` when the options carry a cancellation signal.
pub(crate) fn wire_cancellation<T>(options: &BlockOptions, mailbox: &Arc<Mailbox<T>>)
where
  T: Clone + Send + 'static, {
  let Some(signal) = options.cancellation() else {
    return;
  };
  let mailbox = Arc::downgrade(mailbox);
  signal.on_cancel(move || {
    if let Some(mailbox) = mailbox.upgrade() {
      mailbox.cancel();
    }
  });
}
