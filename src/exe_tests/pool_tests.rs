use std::sync::Arc;
use rbush_3d::{DefaultPolicy, RTree, TreeConfig, TreePool, AABB};
use crate::*;

#[test]
fn pooled_trees()
{
    init_logging();
    let pool = TreePool::<AABB, _>::new(16, DefaultPolicy);

    {
        let mut tree = pool.take();
        tree.load(some_data(16));
        assert_eq!(tree.height(), 1);

        let mut tree2 = pool.take();
        tree2.load(some_data(17));
        assert_eq!(tree2.height(), 2);
    }
    assert_eq!(pool.total_count(), 2);
    assert_eq!(pool.free_count(), 2);

    // returned trees come back empty
    let tree = pool.take();
    assert_eq!(tree.to_plain(), RTree::<AABB>::default().to_plain());
}

#[test]
fn pool_across_threads()
{
    init_logging();
    let pool = Arc::new(TreePool::<AABB, _>::new(8, DefaultPolicy));
    let items = data();

    let workers: Vec<_> = (0..4).map(|_|
    {
        let pool = pool.clone();
        let items = items.clone();
        std::thread::spawn(move ||
        {
            for _ in 0..20
            {
                let mut tree = pool.take_owned();
                tree.load(items.clone());
                assert_eq!(tree.len(), items.len());
                pool.give_back(tree);
            }
        })
    }).collect();

    for worker in workers
    {
        worker.join().unwrap();
    }
    assert_eq!(pool.free_count(), pool.total_count());
}

#[test]
fn config_driven_tree()
{
    let config = TreeConfig::from_toml_str("max_entries = 9").unwrap();
    let mut tree = RTree::with_config(&config, DefaultPolicy);
    assert_eq!(tree.max_entries(), 9);
    assert_eq!(tree.min_entries(), 4);

    tree.load(data());
    assert_same_boxes(tree.all(), &data());
    tree.check_invariants().unwrap();
}
