/// A value kept once for interactive mode and once for ambient mode. The
/// two sides are owned separately; changing one never touches the other.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveAmbient<T> {
    pub active: T,
    pub ambient: T,
}

impl<T> ActiveAmbient<T> {
    pub fn new(active: T, ambient: T) -> Self {
        Self { active, ambient }
    }

    /// Builds both sides from one constructor taking the ambient flag.
    pub fn build(mut make: impl FnMut(bool) -> T) -> Self {
        Self {
            active: make(false),
            ambient: make(true),
        }
    }

    pub fn get(&self, ambient: bool) -> &T {
        if ambient {
            &self.ambient
        } else {
            &self.active
        }
    }

    pub fn get_mut(&mut self, ambient: bool) -> &mut T {
        if ambient {
            &mut self.ambient
        } else {
            &mut self.active
        }
    }

    pub fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> ActiveAmbient<U> {
        ActiveAmbient {
            active: f(&self.active),
            ambient: f(&self.ambient),
        }
    }

    pub fn both_mut(&mut self, mut f: impl FnMut(&mut T)) {
        f(&mut self.active);
        f(&mut self.ambient);
    }
}
