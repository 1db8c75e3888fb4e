/// Halite available to spend this turn, net of amounts promised to planned construction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Treasury {
    pub halite: u32,
    pub reserved: u32,
}

impl Treasury {
    pub fn new(halite: u32) -> Treasury {
        Treasury { halite, reserved: 0 }
    }

    pub fn available(&self) -> u32 {
        self.halite.saturating_sub(self.reserved)
    }

    pub fn can_afford(&self, amount: u32) -> bool {
        self.available() >= amount
    }

    pub fn reserve(&mut self, amount: u32) {
        self.reserved = self.reserved.saturating_add(amount);
    }

    /// Takes `amount` out of the available funds. Returns false, leaving the treasury untouched, when short.
    pub fn spend(&mut self, amount: u32) -> bool {
        if self.can_afford(amount) {
            self.halite -= amount;
            true
        } else {
            false
        }
    }

    /// Pays for something that was reserved earlier, releasing the matching reservation.
    pub fn spend_reserved(&mut self, amount: u32) {
        self.halite = self.halite.saturating_sub(amount);
        self.reserved = self.reserved.saturating_sub(amount);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reservations_reduce_spending_power() {
        let mut treasury = Treasury::new(5000);

        treasury.reserve(4500);

        assert_eq!(treasury.available(), 500);
        assert!(!treasury.spend(1000));
        assert_eq!(treasury.halite, 5000);

        treasury.reserved = 0;

        assert!(treasury.spend(1000));
        assert_eq!(treasury.available(), 4000);
    }
}
