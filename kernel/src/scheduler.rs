// Priority job scheduler for the exhibit's cooperative loop
// NOTE: No dynamic allocation and uses fixed-size queues
//
// Game step and audio pump run first every tick; the indicator pulse and
// the decorative animation only get the time that is left.
use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Job {
    StepGame,
    PumpAudio,

    PulseIndicator,

    Animate,
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Job::StepGame => write!(f, "StepGame"),
            Job::PumpAudio => write!(f, "PumpAudio"),
            Job::PulseIndicator => write!(f, "PulseIndicator"),
            Job::Animate => write!(f, "Animate"),
        }
    }
}

/// Job priority levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Priority {
    High = 0,
    Normal = 1,
    Low = 2,
}

impl Job {
    pub const fn priority(&self) -> Priority {
        match self {
            Job::StepGame | Job::PumpAudio => Priority::High,
            Job::PulseIndicator => Priority::Normal,
            Job::Animate => Priority::Low,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushError {
    /// Queue for this priority level is full, contains the rejected job
    Full(Job),
}

impl fmt::Display for PushError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PushError::Full(job) => write!(f, "queue full, rejected {}", job),
        }
    }
}

// ring buffer for jobs
pub struct JobQueue<const N: usize> {
    buf: [Option<Job>; N],
    head: usize, // next to read
    tail: usize, // next to write
    len: usize,
}

impl<const N: usize> JobQueue<N> {
    pub const fn new() -> Self {
        Self {
            buf: [None; N],
            head: 0,
            tail: 0,
            len: 0,
        }
    }

    pub fn push(&mut self, job: Job) -> Result<(), Job> {
        if self.len >= N {
            return Err(job);
        }
        self.buf[self.tail] = Some(job);
        self.tail = (self.tail + 1) % N;
        self.len += 1;
        Ok(())
    }

    pub fn pop(&mut self) -> Option<Job> {
        if self.len == 0 {
            return None;
        }
        let job = self.buf[self.head].take();
        self.head = (self.head + 1) % N;
        self.len -= 1;
        job
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn clear(&mut self) {
        while self.pop().is_some() {}
    }

    pub fn contains(&self, job: &Job) -> bool {
        let mut i = self.head;
        for _ in 0..self.len {
            if self.buf[i].as_ref() == Some(job) {
                return true;
            }
            i = (i + 1) % N;
        }
        false
    }
}

impl<const N: usize> Default for JobQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}

pub struct Scheduler {
    high: JobQueue<4>,
    normal: JobQueue<4>,
    low: JobQueue<4>,
}

impl Scheduler {
    pub const fn new() -> Self {
        Self {
            high: JobQueue::new(),
            normal: JobQueue::new(),
            low: JobQueue::new(),
        }
    }

    fn queue(&mut self, priority: Priority) -> &mut JobQueue<4> {
        match priority {
            Priority::High => &mut self.high,
            Priority::Normal => &mut self.normal,
            Priority::Low => &mut self.low,
        }
    }

    // push a job and returns error with the job if queue is full
    pub fn push(&mut self, job: Job) -> Result<(), PushError> {
        self.queue(job.priority()).push(job).map_err(PushError::Full)
    }

    // Schedule a job only if it's not already queued (dedup that queue).
    pub fn push_unique(&mut self, job: Job) -> Result<(), PushError> {
        let queue = self.queue(job.priority());
        if queue.contains(&job) {
            return Ok(());
        }
        queue.push(job).map_err(PushError::Full)
    }

    // the next job to execute
    pub fn pop(&mut self) -> Option<Job> {
        self.high
            .pop()
            .or_else(|| self.normal.pop())
            .or_else(|| self.low.pop())
    }

    pub fn is_empty(&self) -> bool {
        self.high.is_empty() && self.normal.is_empty() && self.low.is_empty()
    }

    pub fn pending(&self) -> usize {
        self.high.len() + self.normal.len() + self.low.len()
    }

    pub fn pending_by_priority(&self, priority: Priority) -> usize {
        match priority {
            Priority::High => self.high.len(),
            Priority::Normal => self.normal.len(),
            Priority::Low => self.low.len(),
        }
    }

    pub fn clear(&mut self) {
        self.high.clear();
        self.normal.clear();
        self.low.clear();
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}
