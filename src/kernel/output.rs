//! 运行输出面板：只读、按到达顺序追加，容量有上限

use std::collections::VecDeque;

pub const MAX_OUTPUT_LINES: usize = 5000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStream {
    Stdout,
    Stderr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputTag {
    Info,
    /// 子进程 stdout
    Success,
    /// 子进程 stderr 及启动失败
    Error,
}

impl From<OutputStream> for OutputTag {
    fn from(stream: OutputStream) -> Self {
        match stream {
            OutputStream::Stdout => Self::Success,
            OutputStream::Stderr => Self::Error,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLine {
    pub text: String,
    pub tag: OutputTag,
}

#[derive(Debug)]
pub struct OutputPanel {
    run_id: u64,
    lines: VecDeque<OutputLine>,
    running: bool,
    pub visible: bool,
    pub scroll: usize,
}

impl Default for OutputPanel {
    fn default() -> Self {
        Self {
            run_id: 0,
            lines: VecDeque::new(),
            running: false,
            visible: false,
            scroll: 0,
        }
    }
}

impl OutputPanel {
    pub fn run_id(&self) -> u64 {
        self.run_id
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn lines(&self) -> &VecDeque<OutputLine> {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// 开始新一轮运行：清空面板、写入标题行并返回新的 run id
    pub fn begin(&mut self, script: &str) -> u64 {
        self.run_id += 1;
        self.lines.clear();
        self.scroll = 0;
        self.running = true;
        self.visible = true;
        self.append(format!("--- Running: {script} ---"), OutputTag::Info);
        self.run_id
    }

    /// 过期 run 的行被丢弃
    pub fn push(&mut self, run_id: u64, stream: OutputStream, line: String) -> bool {
        if run_id != self.run_id {
            return false;
        }
        self.append(line, stream.into());
        true
    }

    pub fn finish(&mut self, run_id: u64, code: Option<i32>) -> bool {
        if run_id != self.run_id || !self.running {
            return false;
        }
        self.running = false;
        let text = match code {
            Some(code) => format!("--- exited with code {code} ---"),
            None => "--- terminated by signal ---".to_string(),
        };
        let tag = if code == Some(0) {
            OutputTag::Info
        } else {
            OutputTag::Error
        };
        self.append(text, tag);
        true
    }

    pub fn launch_failed(&mut self, run_id: u64, program: &str, error: &str) -> bool {
        if run_id != self.run_id || !self.running {
            return false;
        }
        self.running = false;
        self.append("--- launch failed ---".to_string(), OutputTag::Error);
        self.append(format!("{program}: {error}"), OutputTag::Error);
        true
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
    }

    fn append(&mut self, text: String, tag: OutputTag) {
        if self.lines.len() == MAX_OUTPUT_LINES {
            self.lines.pop_front();
        }
        self.lines.push_back(OutputLine { text, tag });
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/output.rs"]
mod tests;
