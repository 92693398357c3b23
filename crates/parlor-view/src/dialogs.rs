use std::collections::VecDeque;

/// Blocking user dialogs: alert, confirm, and text prompt.
pub trait Dialogs {
    fn alert(&mut self, message: &str);
    fn confirm(&mut self, message: &str) -> bool;
    /// `None` when the user dismisses the prompt.
    fn prompt(&mut self, message: &str, default: &str) -> Option<String>;
}

/// Dialogs answered from a script, recording what was shown.
#[derive(Debug, Default)]
pub struct ScriptedDialogs {
    pub confirm_answer: bool,
    pub prompt_answers: VecDeque<Option<String>>,
    pub alerts: Vec<String>,
    pub confirms: Vec<String>,
}

impl ScriptedDialogs {
    pub fn confirming() -> Self {
        Self {
            confirm_answer: true,
            ..Self::default()
        }
    }

    pub fn queue_prompt(&mut self, answer: Option<&str>) {
        self.prompt_answers.push_back(answer.map(str::to_string));
    }
}

impl Dialogs for ScriptedDialogs {
    fn alert(&mut self, message: &str) {
        self.alerts.push(message.to_string());
    }

    fn confirm(&mut self, message: &str) -> bool {
        self.confirms.push(message.to_string());
        self.confirm_answer
    }

    fn prompt(&mut self, _message: &str, _default: &str) -> Option<String> {
        self.prompt_answers.pop_front().flatten()
    }
}
