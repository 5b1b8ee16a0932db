mod catch_up_sweep;
mod ensure_scheduled;
mod send_reminder;

pub use catch_up_sweep::CatchUpSweepUseCase;
pub use ensure_scheduled::EnsureRemindersScheduledUseCase;
pub use send_reminder::SendPlanReminderUseCase;
