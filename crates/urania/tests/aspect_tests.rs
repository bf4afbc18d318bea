use urania::aspects::{match_aspect, AspectCalculator, AspectKind, OrbContext, OrbTable};
use urania::positions::BodyPosition;
use urania::BodyId;

fn moving(body: BodyId, longitude: f64, speed: f64) -> BodyPosition {
    let mut p = BodyPosition::stationary(body, longitude);
    p.speed = speed;
    p.retrograde = speed < 0.0;
    p
}

#[test]
fn test_sun_moon_sextile() {
    let positions = vec![
        moving(BodyId::Sun, 10.0, 0.98),
        moving(BodyId::Moon, 68.0, 13.1),
    ];
    let aspects = AspectCalculator::natal().natal_aspects(&positions);

    assert_eq!(aspects.len(), 1);
    let aspect = &aspects[0];
    assert_eq!(aspect.kind, AspectKind::Sextile);
    assert_eq!((aspect.first, aspect.second), (BodyId::Sun, BodyId::Moon));
    assert!((aspect.orb - 2.0).abs() < 1e-9);
    assert!(aspect.orb <= 10.0);
}

#[test]
fn test_applying_flag_is_consistent_for_pair() {
    // the 58 degree gap shrinks, moving away from an exact sextile
    let positions = vec![
        moving(BodyId::Sun, 10.0, 1.0),
        moving(BodyId::Moon, 68.0, -0.5),
    ];
    let aspects = AspectCalculator::natal().natal_aspects(&positions);
    let sextile = aspects.iter().find(|a| a.kind == AspectKind::Sextile).unwrap();
    assert!(!sextile.applying);

    // reversing the pair order must not change the answer
    let reversed: Vec<BodyPosition> = positions.into_iter().rev().collect();
    let aspects = AspectCalculator::natal().natal_aspects(&reversed);
    assert!(!aspects[0].applying);
}

#[test]
fn test_every_orb_within_class_limit() {
    let bodies = [
        BodyId::Sun,
        BodyId::Moon,
        BodyId::Mercury,
        BodyId::Venus,
        BodyId::Mars,
        BodyId::Jupiter,
        BodyId::Saturn,
        BodyId::Uranus,
        BodyId::Neptune,
        BodyId::Pluto,
    ];
    let positions: Vec<BodyPosition> = bodies
        .iter()
        .enumerate()
        .map(|(i, b)| moving(*b, (i as f64 * 37.3) % 360.0, 1.0 - i as f64 * 0.2))
        .collect();

    let natal = AspectCalculator::natal();
    for aspect in natal.natal_aspects(&positions) {
        assert!(aspect.orb >= 0.0);
        assert!(aspect.orb <= OrbTable::natal().pair_orb(aspect.first, aspect.second));
    }

    let transit = AspectCalculator::new(OrbTable::transit(), OrbContext::Transit);
    for body in &positions {
        for aspect in transit.transit_aspects(body, &positions) {
            assert!(aspect.orb <= OrbTable::transit().orb_for(aspect.first));
        }
    }
}

#[test]
fn test_transit_orbs_are_tighter() {
    // 5 degrees off a square: natal yes, transit no
    assert!(match_aspect(0.0, 95.0, 0.0, 0.0, OrbTable::natal().orb_for(BodyId::Mars)).is_some());
    assert!(match_aspect(0.0, 95.0, 0.0, 0.0, OrbTable::transit().orb_for(BodyId::Mars)).is_none());
}

#[test]
fn test_node_axis_is_not_reported_as_an_opposition() {
    let positions = vec![
        moving(BodyId::Sun, 100.0, 0.98),
        moving(BodyId::NorthNode, 101.0, -0.05),
        moving(BodyId::SouthNode, 281.0, -0.05),
    ];
    let aspects = AspectCalculator::natal().natal_aspects(&positions);

    assert_eq!(aspects.len(), 2);
    assert!(aspects
        .iter()
        .any(|a| a.second == BodyId::NorthNode && a.kind == AspectKind::Conjunction));
    assert!(aspects
        .iter()
        .any(|a| a.second == BodyId::SouthNode && a.kind == AspectKind::Opposition));
    assert!(!aspects
        .iter()
        .any(|a| a.first == BodyId::NorthNode && a.second == BodyId::SouthNode));
}
