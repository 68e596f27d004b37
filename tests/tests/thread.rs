use kampus_api::{
    CommentSource, Error, PostId, UserId, Uuid,
    VoteDirection::{Down, Up},
    VoteStore, VoteTarget,
};
use kampus_client::{build_tree, find, node_count, PostThread, VoteResolution, VoteSnapshot};
use kampus_mock_server::MockServer;
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use tests::{base_time, gen_thread};

fn snap(like_count: i64, dislike_count: i64, viewer_vote: Option<kampus_api::VoteDirection>) -> VoteSnapshot {
    VoteSnapshot {
        like_count,
        dislike_count,
        viewer_vote,
    }
}

#[test]
fn generated_threads_survive_any_fetch_order() {
    let mut rng = StdRng::seed_from_u64(0xCA_FE);
    for _ in 0..20 {
        let post = PostId(Uuid::new_v4());
        let voters = (0..3).map(|_| UserId(Uuid::new_v4())).collect::<Vec<_>>();
        let flat = gen_thread(&mut rng, post, &voters, 40);
        let forest = build_tree(flat.clone(), Some(voters[0]));
        assert_eq!(node_count(&forest), flat.len());
        let mut shuffled = flat;
        shuffled.shuffle(&mut rng);
        assert_eq!(build_tree(shuffled, Some(voters[0])), forest);
    }
}

#[tokio::test]
async fn confirmed_votes_keep_client_and_store_in_agreement() {
    let mut server = MockServer::new();
    let viewer = server.create_user("selin").unwrap();
    let post = server
        .create_post(Some(viewer), false, "midterms start monday", base_time())
        .unwrap();
    let target = VoteTarget::Post(post);
    let flat = server.fetch_comments(post).await.unwrap();
    let mut thread = PostThread::new(server.post(post).unwrap().clone(), flat, Some(viewer));

    assert_eq!(thread.vote(&mut server, target, Up).await.unwrap(), VoteResolution::Confirmed);
    assert_eq!(thread.post_snapshot(), snap(1, 0, Some(Up)));
    assert_eq!(server.post(post).unwrap().like_count, 1);

    // switch
    assert_eq!(thread.vote(&mut server, target, Down).await.unwrap(), VoteResolution::Confirmed);
    assert_eq!(thread.post_snapshot(), snap(0, 1, Some(Down)));
    assert_eq!(server.post(post).unwrap().dislike_count, 1);
    assert_eq!(server.post(post).unwrap().like_count, 0);

    // undo
    assert_eq!(thread.vote(&mut server, target, Down).await.unwrap(), VoteResolution::Confirmed);
    assert_eq!(thread.post_snapshot(), snap(0, 0, None));
    assert_eq!(server.post(post).unwrap().votes.len(), 0);
}

#[tokio::test]
async fn failed_post_vote_reverts_to_the_exact_previous_counts() {
    let mut server = MockServer::new();
    let viewer = server.create_user("selin").unwrap();
    let post = server
        .create_post(None, true, "free cay in the cafeteria today", base_time())
        .unwrap();
    for i in 0..4 {
        let u = server.create_user(&format!("student-{i}")).unwrap();
        let direction = match i < 3 {
            true => Up,
            false => Down,
        };
        server
            .create_vote(VoteTarget::Post(post), u, direction)
            .await
            .unwrap();
    }
    let flat = server.fetch_comments(post).await.unwrap();
    let mut thread = PostThread::new(server.post(post).unwrap().clone(), flat, Some(viewer));
    assert_eq!(thread.post_snapshot(), snap(3, 1, None));

    server.fail_next_op();
    let resolution = thread
        .vote(&mut server, VoteTarget::Post(post), Up)
        .await
        .unwrap();
    assert_eq!(resolution, VoteResolution::RolledBack);
    assert_eq!(thread.post_snapshot(), snap(3, 1, None));
    assert_eq!(server.post(post).unwrap().like_count, 3);
    assert_eq!(server.post(post).unwrap().dislike_count, 1);
}

#[tokio::test]
async fn failed_comment_vote_rolls_back_and_a_refetch_restores_agreement() {
    let mut server = MockServer::new();
    let viewer = server.create_user("selin").unwrap();
    let post = server
        .create_post(Some(viewer), false, "anyone selling a calculus book?", base_time())
        .unwrap();
    let x = server
        .create_comment(post, None, Some(viewer), "i have one", base_time())
        .unwrap();
    let target = VoteTarget::Comment(x);
    for i in 0..5 {
        let u = server.create_user(&format!("student-{i}")).unwrap();
        server.create_vote(target, u, Up).await.unwrap();
    }
    server.create_vote(target, viewer, Up).await.unwrap();

    let flat = server.fetch_comments(post).await.unwrap();
    let mut thread = PostThread::new(server.post(post).unwrap().clone(), flat, Some(viewer));
    let displayed = |thread: &PostThread| {
        let node = find(&thread.comments, x).unwrap();
        snap(node.comment.like_count, node.comment.dislike_count, node.viewer_vote)
    };
    assert_eq!(displayed(&thread), snap(6, 0, Some(Up)));

    // tapping the same direction again undoes the vote
    assert_eq!(thread.vote(&mut server, target, Up).await.unwrap(), VoteResolution::Confirmed);
    assert_eq!(displayed(&thread), snap(5, 0, None));

    // a failing vote is rolled back and asks for a refetch
    server.fail_next_op();
    let resolution = thread.vote(&mut server, target, Down).await.unwrap();
    assert_eq!(resolution, VoteResolution::RolledBackRefetch);
    assert_eq!(displayed(&thread), snap(5, 0, None));

    thread.refresh_comments(server.fetch_comments(post).await.unwrap());
    assert_eq!(displayed(&thread), snap(5, 0, None));
}

#[tokio::test]
async fn deletion_is_confirmed_first_and_discards_the_subtree() {
    let mut server = MockServer::new();
    let viewer = server.create_user("selin").unwrap();
    let post = server
        .create_post(Some(viewer), false, "dorm wifi is down again", base_time())
        .unwrap();
    let p = server
        .create_comment(post, None, Some(viewer), "same in block c", base_time())
        .unwrap();
    let q = server
        .create_comment(post, Some(p), None, "try the library", base_time())
        .unwrap();
    let r = server
        .create_comment(post, Some(q), None, "library closes at ten", base_time())
        .unwrap();

    let flat = server.fetch_comments(post).await.unwrap();
    let mut thread = PostThread::new(server.post(post).unwrap().clone(), flat, Some(viewer));
    assert_eq!(node_count(&thread.comments), 3);

    // a failed delete leaves the comment visible
    server.fail_next_op();
    assert!(thread.delete_comment(&mut server, p).await.is_err());
    assert!(find(&thread.comments, p).is_some());

    thread.delete_comment(&mut server, p).await.unwrap();
    assert!(find(&thread.comments, p).is_none());
    // the replies go with it instead of being promoted
    assert!(find(&thread.comments, q).is_none());
    assert!(find(&thread.comments, r).is_none());
    assert_eq!(node_count(&thread.comments), 0);

    // server-side the reply rows survive with a dangling parent, so a
    // refetch surfaces them as roots
    assert!(server.comment(q).is_some());
    thread.refresh_comments(server.fetch_comments(post).await.unwrap());
    assert!(find(&thread.comments, q).is_some());
}

#[tokio::test]
async fn unauthenticated_viewers_never_reach_the_store() {
    let mut server = MockServer::new();
    let author = server.create_user("selin").unwrap();
    let post = server
        .create_post(Some(author), false, "lost my student card", base_time())
        .unwrap();
    let c = server
        .create_comment(post, None, Some(author), "check the cafeteria", base_time())
        .unwrap();

    let flat = server.fetch_comments(post).await.unwrap();
    let mut thread = PostThread::new(server.post(post).unwrap().clone(), flat, None);

    let ops = server.store_ops();
    assert_eq!(
        thread.vote(&mut server, VoteTarget::Post(post), Up).await,
        Err(Error::Unauthenticated)
    );
    assert_eq!(
        thread.delete_comment(&mut server, c).await,
        Err(Error::Unauthenticated)
    );
    assert_eq!(server.store_ops(), ops);
    assert!(find(&thread.comments, c).is_some());
}

#[tokio::test]
async fn the_store_enforces_one_vote_per_viewer_per_entity() {
    let mut server = MockServer::new();
    let viewer = server.create_user("selin").unwrap();
    let post = server
        .create_post(Some(viewer), false, "gym hours over the break?", base_time())
        .unwrap();
    let target = VoteTarget::Post(post);

    server.create_vote(target, viewer, Up).await.unwrap();
    assert_eq!(
        server.create_vote(target, viewer, Down).await,
        Err(Error::VoteAlreadyRecorded(post.0))
    );

    let stranger = server.create_user("deniz").unwrap();
    assert_eq!(
        server.update_vote(target, stranger, Down).await,
        Err(Error::UnknownEntity(post.0))
    );
    assert_eq!(
        server.delete_vote(target, stranger).await,
        Err(Error::UnknownEntity(post.0))
    );
}
