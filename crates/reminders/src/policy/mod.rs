mod set_policy;

pub use set_policy::SetReminderPolicyUseCase;
