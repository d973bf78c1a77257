//! Collision detection for lane entities
//!
//! Both resolvers are read-only: they look at a snapshot of the entities and
//! return a plan. The tick applies the plan afterwards, so a customer can
//! never be claimed by two empanadas in the same tick.

use std::collections::HashSet;

use super::state::{Customer, Empanada, Player, Tip};
use crate::consts::{CUSTOMER_HIT_WIDTH, LEFT_EDGE_X};

/// An empanada reaching a customer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectileHit {
    pub empanada_id: u32,
    pub customer_id: u32,
}

/// Outcome of resolving every in-flight empanada for one tick
#[derive(Debug, Clone, Default)]
pub struct ProjectileResolution {
    pub hits: Vec<ProjectileHit>,
    /// Empanadas whose next position leaves the playfield
    pub missed: Vec<u32>,
}

impl ProjectileResolution {
    pub fn miss_count(&self) -> u32 {
        self.missed.len() as u32
    }

    /// Every empanada that must be removed this tick (hits and misses)
    pub fn spent(&self) -> HashSet<u32> {
        self.hits
            .iter()
            .map(|h| h.empanada_id)
            .chain(self.missed.iter().copied())
            .collect()
    }
}

/// Does a customer at `customer_x` cover an empanada arriving at `next_x`?
#[inline]
pub fn reaches(customer_x: f32, next_x: f32) -> bool {
    customer_x + CUSTOMER_HIT_WIDTH >= next_x
}

/// Resolve empanadas against walking customers.
///
/// Each empanada moves `speed` to the left. If that takes it past the left
/// edge it is a miss. Otherwise the walking customer closest to the player in
/// its lane is hit, provided it reaches the empanada's next position and no
/// earlier empanada has claimed it this tick.
pub fn resolve_projectiles(
    empanadas: &[Empanada],
    customers: &[Customer],
    speed: f32,
) -> ProjectileResolution {
    let mut resolution = ProjectileResolution::default();
    let mut claimed: HashSet<u32> = HashSet::new();

    for empanada in empanadas {
        let next_x = empanada.x - speed;
        if next_x < LEFT_EDGE_X {
            resolution.missed.push(empanada.id);
            continue;
        }

        let mut candidates: Vec<&Customer> = customers
            .iter()
            .filter(|c| c.lane == empanada.lane && c.is_walking() && !claimed.contains(&c.id))
            .collect();
        // Closest to the player first
        candidates.sort_by(|a, b| b.x.total_cmp(&a.x));

        if let Some(target) = candidates.into_iter().find(|c| reaches(c.x, next_x)) {
            claimed.insert(target.id);
            resolution.hits.push(ProjectileHit {
                empanada_id: empanada.id,
                customer_id: target.id,
            });
        }
    }

    resolution
}

/// Tips the player is standing on: same lane, within `radius` of `player.x`
pub fn collect_tips(tips: &[Tip], player: Player, radius: f32) -> Vec<u32> {
    tips.iter()
        .filter(|t| t.lane == player.lane && (t.x - player.x).abs() <= radius)
        .map(|t| t.id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{CustomerState, EmpanadaFlavor, TipKind};

    fn empanada(id: u32, lane: usize, x: f32) -> Empanada {
        Empanada {
            id,
            lane,
            x,
            flavor: EmpanadaFlavor::for_id(id),
        }
    }

    fn customer(id: u32, lane: usize, x: f32) -> Customer {
        let mut c = Customer::new(id, lane, 1.5);
        c.x = x;
        c
    }

    #[test]
    fn test_hit_nearest_customer() {
        let empanadas = [empanada(10, 0, 300.0)];
        let customers = [customer(1, 0, 100.0), customer(2, 0, 260.0), customer(3, 1, 280.0)];
        let res = resolve_projectiles(&empanadas, &customers, 12.0);
        assert_eq!(
            res.hits,
            vec![ProjectileHit {
                empanada_id: 10,
                customer_id: 2
            }]
        );
        assert!(res.missed.is_empty());
    }

    #[test]
    fn test_out_of_reach_is_neither_hit_nor_miss() {
        let empanadas = [empanada(10, 0, 300.0)];
        let customers = [customer(1, 0, 100.0)];
        let res = resolve_projectiles(&empanadas, &customers, 12.0);
        assert!(res.hits.is_empty());
        assert!(res.missed.is_empty());
        assert!(res.spent().is_empty());
    }

    #[test]
    fn test_left_edge_miss() {
        let empanadas = [empanada(10, 0, LEFT_EDGE_X + 5.0)];
        let customers = [customer(1, 0, LEFT_EDGE_X)];
        let res = resolve_projectiles(&empanadas, &customers, 12.0);
        assert!(res.hits.is_empty());
        assert_eq!(res.missed, vec![10]);
        assert_eq!(res.miss_count(), 1);
    }

    #[test]
    fn test_customer_claimed_once_per_tick() {
        let empanadas = [empanada(10, 0, 300.0), empanada(11, 0, 310.0)];
        let customers = [customer(1, 0, 270.0), customer(2, 0, 50.0)];
        let res = resolve_projectiles(&empanadas, &customers, 12.0);
        // The second empanada cannot reach the far customer this tick
        assert_eq!(res.hits.len(), 1);
        assert_eq!(res.hits[0].customer_id, 1);
    }

    #[test]
    fn test_two_empanadas_two_customers() {
        let empanadas = [empanada(10, 0, 300.0), empanada(11, 0, 300.0)];
        let customers = [customer(1, 0, 270.0), customer(2, 0, 260.0)];
        let res = resolve_projectiles(&empanadas, &customers, 12.0);
        let claimed: Vec<u32> = res.hits.iter().map(|h| h.customer_id).collect();
        assert_eq!(claimed, vec![1, 2]);
    }

    #[test]
    fn test_satisfied_customers_ignored() {
        let empanadas = [empanada(10, 0, 300.0)];
        let mut c = customer(1, 0, 280.0);
        c.state = CustomerState::Satisfied;
        let res = resolve_projectiles(&empanadas, &[c], 12.0);
        assert!(res.hits.is_empty());
    }

    #[test]
    fn test_collect_tips_by_lane_and_radius() {
        let tips = [
            Tip {
                id: 1,
                lane: 2,
                x: 300.0,
                kind: TipKind::Coin,
                created_at_ms: 0.0,
            },
            Tip {
                id: 2,
                lane: 2,
                x: 500.0,
                kind: TipKind::Bill,
                created_at_ms: 0.0,
            },
            Tip {
                id: 3,
                lane: 1,
                x: 320.0,
                kind: TipKind::Bag,
                created_at_ms: 0.0,
            },
        ];
        let player = Player { lane: 2, x: 330.0 };
        assert_eq!(collect_tips(&tips, player, 40.0), vec![1]);
    }
}
