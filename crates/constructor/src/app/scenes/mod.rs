mod cosmos;
mod micro;
mod planet;
mod singularity;
mod util;

use reality_engine::SceneSet;

use cosmos::CosmosScene;
use micro::MicroScene;
use planet::PlanetScene;
use singularity::SingularityScene;

pub(crate) fn build_scene_set(point_budget: usize) -> SceneSet {
    SceneSet {
        singularity: Box::new(SingularityScene::new(point_budget)),
        cosmos: Box::new(CosmosScene::new(point_budget)),
        planet: Box::new(PlanetScene::new(point_budget)),
        micro: Box::new(MicroScene::new(point_budget)),
    }
}

#[cfg(test)]
mod tests {
    use reality_engine::{JourneyStore, SceneWorld};

    use super::*;

    #[test]
    fn every_scene_loads_with_a_default_budget() {
        let mut set = build_scene_set(reality_engine::journey::DEFAULT_POINT_BUDGET);
        for (stage, scene) in [
            (0, &mut set.singularity),
            (1, &mut set.cosmos),
            (2, &mut set.planet),
            (4, &mut set.micro),
        ] {
            let mut journey = JourneyStore::default();
            journey.set_stage(stage);
            let mut world = SceneWorld::default();
            scene.load(&journey, &mut world);
            scene.update(1.0 / 60.0, &journey, &mut world);
            assert!(world.point_count() > 0, "stage {stage} drew nothing");
            assert!(!world.markers().is_empty(), "stage {stage} has no markers");
            scene.unload(&mut world);
        }
    }
}
