//! Run-length hysteresis for the open / closed classification.
//!
//! A raw per-sample reading flips the stable output only after a run of
//! identical votes.  The two directions have separate thresholds so one
//! state can be made "stickier" than the other.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Hysteresis {
    open_run:         u32,
    closed_run:       u32,
    stable_open:      bool,
    open_threshold:   u32,
    closed_threshold: u32,
}

impl Hysteresis {
    pub fn new(open_threshold: u32, closed_threshold: u32, initial_open: bool) -> Self {
        Hysteresis {
            open_run: 0,
            closed_run: 0,
            stable_open: initial_open,
            open_threshold: open_threshold.max(1),
            closed_threshold: closed_threshold.max(1),
        }
    }

    pub fn stable_open(&self) -> bool { self.stable_open }
    pub fn open_run(&self)    -> u32  { self.open_run }
    pub fn closed_run(&self)  -> u32  { self.closed_run }

    /// Count one raw reading.  Returns `true` if the stable output flipped.
    pub fn vote(&mut self, raw_open: bool) -> bool {
        if raw_open {
            self.open_run = self.open_run.saturating_add(1);
            self.closed_run = 0;
        } else {
            self.closed_run = self.closed_run.saturating_add(1);
            self.open_run = 0;
        }

        let before = self.stable_open;
        if self.open_run >= self.open_threshold {
            self.stable_open = true;
        } else if self.closed_run >= self.closed_threshold {
            self.stable_open = false;
        }
        before != self.stable_open
    }

    /// Force the stable output, crediting the winning side with `run` votes.
    pub fn seed(&mut self, open: bool, run: u32) {
        self.stable_open = open;
        if open {
            self.open_run = run;
            self.closed_run = 0;
        } else {
            self.closed_run = run;
            self.open_run = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_flip_is_ignored() {
        let mut h = Hysteresis::new(8, 6, false);
        for _ in 0..20 { h.vote(false); }
        assert!(!h.vote(true));
        assert!(!h.stable_open());
        for _ in 0..20 { h.vote(false); }
        assert!(!h.stable_open());
    }

    #[test]
    fn open_needs_eight_in_a_row() {
        let mut h = Hysteresis::new(8, 6, false);
        for i in 1..8 {
            assert!(!h.vote(true), "flipped early at vote {}", i);
        }
        assert!(h.vote(true));
        assert!(h.stable_open());
    }

    #[test]
    fn closed_needs_six_in_a_row() {
        let mut h = Hysteresis::new(8, 6, true);
        for _ in 0..5 { h.vote(false); }
        assert!(h.stable_open());
        h.vote(false);
        assert!(!h.stable_open());
    }

    #[test]
    fn interrupted_run_starts_over() {
        let mut h = Hysteresis::new(8, 6, false);
        for _ in 0..7 { h.vote(true); }
        h.vote(false);
        for _ in 0..7 { h.vote(true); }
        assert!(!h.stable_open());
        h.vote(true);
        assert!(h.stable_open());
    }

    #[test]
    fn seed_sets_output_and_counters() {
        let mut h = Hysteresis::new(8, 6, true);
        h.seed(false, 10);
        assert!(!h.stable_open());
        assert_eq!((h.open_run(), h.closed_run()), (0, 10));
        // A single opposing vote cannot undo the seed.
        h.vote(true);
        assert!(!h.stable_open());
    }
}
