use super::*;

struct Named(&'static str);

impl crate::kernel::services::ports::ScBackend for Named {
    fn name(&self) -> &str {
        self.0
    }

    fn is_controlled(&self, _path: &Path) -> bool {
        true
    }

    fn repository(&self, _path: &Path) -> Option<String> {
        None
    }

    fn fetch(
        &self,
        paths: &[PathBuf],
        _rev: Option<&str>,
        _date: Option<&str>,
    ) -> Vec<Option<String>> {
        paths.iter().map(|_| None).collect()
    }

    fn status(&self, _paths: &[PathBuf], _recursive: bool, _status: &mut StatusMap) {}
}

fn entry(path: &str, backend: &BackendDescriptor) -> BatchEntry {
    BatchEntry {
        node: NodeId::new(),
        data: Arc::new(NodeData::new(path)),
        path: PathBuf::from(path),
        backend: backend.clone(),
    }
}

#[test]
fn groups_keep_first_seen_order() {
    let svn = BackendDescriptor::new("svn", Arc::new(Named("svn")));
    let git = BackendDescriptor::new("git", Arc::new(Named("git")));

    let batch = vec![
        entry("/a/1", &svn),
        entry("/b/1", &git),
        entry("/a/2", &svn),
        entry("/b/2", &git),
        entry("/a/3", &svn),
    ];
    let groups = group_by_backend(batch);

    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].0.key, "svn");
    let paths: Vec<_> = groups[0].1.iter().map(|e| e.path.clone()).collect();
    assert_eq!(
        paths,
        vec![
            PathBuf::from("/a/1"),
            PathBuf::from("/a/2"),
            PathBuf::from("/a/3")
        ]
    );
    assert_eq!(groups[1].0.key, "git");
    assert_eq!(groups[1].1.len(), 2);
}

#[test]
fn same_key_different_instance_is_a_separate_group() {
    let first = BackendDescriptor::new("svn", Arc::new(Named("svn")));
    let second = BackendDescriptor::new("svn", Arc::new(Named("svn")));

    let groups = group_by_backend(vec![entry("/a/1", &first), entry("/a/2", &second)]);
    assert_eq!(groups.len(), 2);
}

#[test]
fn empty_batch_has_no_groups() {
    assert!(group_by_backend(Vec::new()).is_empty());
}

#[test]
fn request_ids_increase() {
    let (tx, _rx) = crate::kernel::services::bus::sc_event_bus();
    let controller =
        SourceController::new(crate::kernel::services::adapters::sc::ScConfig::default().into_shared(), tx)
            .unwrap();
    let first = controller.submit(Vec::new(), ScCommandKind::Commit, Default::default(), None);
    let second = controller.submit(Vec::new(), ScCommandKind::Commit, Default::default(), None);
    assert!(second.0 > first.0);
}
